use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LoadMoreButtonProps {
    pub has_more: bool,
    pub is_fetching: bool,
    pub on_click: Callback<()>,
}

/// Renders nothing once the list is exhausted.
#[function_component]
pub fn LoadMoreButton(props: &LoadMoreButtonProps) -> Html {
    if !props.has_more {
        return html! {};
    }

    let onclick = props.on_click.reform(|_: MouseEvent| ());

    html! {
        <div class="flex justify-center py-4">
            <button
                {onclick}
                disabled={props.is_fetching}
                class="px-4 py-2 rounded-md border border-neutral-300 text-sm disabled:opacity-50"
            >
                if props.is_fetching {
                    {"Loading..."}
                } else {
                    {"Load more"}
                }
            </button>
        </div>
    }
}
