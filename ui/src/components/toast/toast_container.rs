use super::ToastItem;
use crate::contexts::toast::ToastContext;
use yew::prelude::*;

#[function_component]
pub fn ToastContainer() -> Html {
    let Some(context) = use_context::<ToastContext>() else {
        return html! {};
    };

    let mut toasts: Vec<_> = context.toasts.values().cloned().collect();
    // uuids carry no order; keep the rendering stable at least
    toasts.sort_by_key(|toast| toast.id);

    if toasts.is_empty() {
        return html! {};
    }

    html! {
        <div class="fixed bottom-4 right-4 z-50 space-y-3 max-w-sm w-full">
            {for toasts.into_iter().map(|toast| html! {
                <ToastItem key={toast.id.to_string()} toast={toast} />
            })}
        </div>
    }
}
