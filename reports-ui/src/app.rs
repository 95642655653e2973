//! App Root Component

use leptos::*;

use crate::pages::Reports;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-gray-900 text-white flex flex-col">
            <main class="flex-1 container mx-auto px-4 py-8">
                <Reports />
            </main>
        </div>
    }
}
