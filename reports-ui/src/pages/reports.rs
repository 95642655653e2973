//! Reports Page
//!
//! Date range form, granularity buttons and the trends chart.

use leptos::*;
use trend_reports::{ChartRenderer, ChartSpec, Granularity, ReportForm};

use crate::api;
use crate::components::CanvasSurface;

/// Id of the chart canvas
pub const CHART_CANVAS_ID: &str = "reportChart";

/// Reports page component
#[component]
pub fn Reports() -> impl IntoView {
    let form = create_rw_signal(ReportForm::new());
    let canvas_ref = create_node_ref::<html::Canvas>();

    // Created on the first response, once the canvas is mounted
    let renderer = store_value(None::<ChartRenderer<CanvasSurface>>);

    on_cleanup(move || {
        // Dropping the renderer destroys the chart
        let _ = renderer.try_update_value(|r| r.take());
    });

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();

        let request = match form.with_untracked(|f| f.submit()) {
            Ok(request) => request,
            Err(e) => {
                web_sys::console::warn_1(&format!("Report not submitted: {}", e).into());
                return;
            }
        };

        spawn_local(async move {
            let trends = match api::fetch_trends(&request).await {
                Ok(trends) => trends,
                Err(e) => {
                    web_sys::console::error_1(&format!("Error fetching trends: {}", e).into());
                    return;
                }
            };

            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let spec = ChartSpec::from(trends);

            renderer.update_value(|renderer| {
                if renderer.is_none() {
                    match CanvasSurface::new((*canvas).clone()) {
                        Ok(surface) => *renderer = Some(ChartRenderer::new(surface)),
                        Err(e) => {
                            web_sys::console::error_1(&format!("Error creating chart: {}", e).into());
                            return;
                        }
                    }
                }

                if let Some(renderer) = renderer {
                    if let Err(e) = renderer.render_spec(&spec) {
                        web_sys::console::error_1(&format!("Error rendering chart: {}", e).into());
                    }
                }
            });
        });
    };

    view! {
        <div class="space-y-8">
            // Page header
            <div>
                <h1 class="text-3xl font-bold">"Reports"</h1>
                <p class="text-gray-400 mt-1">"Event counts over a date range"</p>
            </div>

            <section class="bg-gray-800 rounded-xl p-6">
                <form on:submit=on_submit class="space-y-4">
                    <div class="grid md:grid-cols-2 gap-4">
                        <DateInput
                            id="start_date"
                            label="Start date"
                            on_change=move |value: String| form.update(|f| {
                                if let Err(e) = f.set_start_input(&value) {
                                    web_sys::console::warn_1(&e.to_string().into());
                                }
                            })
                        />
                        <DateInput
                            id="end_date"
                            label="End date"
                            on_change=move |value: String| form.update(|f| {
                                if let Err(e) = f.set_end_input(&value) {
                                    web_sys::console::warn_1(&e.to_string().into());
                                }
                            })
                        />
                    </div>

                    // Granularity selector
                    <div class="flex space-x-2">
                        {Granularity::ALL
                            .into_iter()
                            .map(|granularity| {
                                view! { <GranularityButton form=form granularity=granularity /> }
                            })
                            .collect_view()}
                    </div>

                    <div class="flex space-x-2">
                        <button
                            type="submit"
                            class="flex-1 bg-primary-600 hover:bg-primary-700 rounded-lg py-3 font-semibold transition-colors"
                        >
                            "Generate Report"
                        </button>
                        // No export is wired up yet
                        <button
                            type="button"
                            class="px-6 bg-gray-700 hover:bg-gray-600 rounded-lg py-3 font-semibold transition-colors"
                        >
                            "Download"
                        </button>
                    </div>
                </form>
            </section>

            <section class="bg-gray-800 rounded-xl p-6">
                <canvas
                    id=CHART_CANVAS_ID
                    node_ref=canvas_ref
                    width="800"
                    height="400"
                    class="w-full h-64 md:h-96 rounded-lg"
                />
            </section>
        </div>
    }
}

/// Required `datetime-local` input
#[component]
fn DateInput(
    id: &'static str,
    label: &'static str,
    #[prop(into)] on_change: Callback<String>,
) -> impl IntoView {
    view! {
        <label for=id class="block">
            <span class="text-sm text-gray-300">{label}</span>
            <input
                type="datetime-local"
                id=id
                name=id
                required=true
                on:input=move |ev| on_change.call(event_target_value(&ev))
                class="mt-1 w-full bg-gray-700 border border-gray-600 rounded-lg px-3 py-2"
            />
        </label>
    }
}

/// One of the four granularity buttons; exactly one carries the active class
#[component]
fn GranularityButton(form: RwSignal<ReportForm>, granularity: Granularity) -> impl IntoView {
    view! {
        <button
            type="button"
            on:click=move |_| form.update(|f| f.select(granularity))
            class=move || {
                let base = "px-4 py-2 rounded-lg text-sm font-medium transition-colors";
                format!("{} {}", base, form.with(|f| f.button_class(granularity)))
            }
        >
            {granularity.label()}
        </button>
    }
}
