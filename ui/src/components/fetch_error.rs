use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FetchErrorProps {
    pub message: AttrValue,
    pub on_retry: Callback<()>,
}

#[function_component]
pub fn FetchError(props: &FetchErrorProps) -> Html {
    let onclick = props.on_retry.reform(|_: MouseEvent| ());

    html! {
        <div class="p-4 my-4 rounded-md border border-red-200 bg-red-50 text-red-700">
            <p class="text-sm">{&props.message}</p>
            <button {onclick} class="mt-2 text-sm font-medium underline">
                {"Try again"}
            </button>
        </div>
    }
}
