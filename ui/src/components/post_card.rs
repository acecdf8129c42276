use payloads::responses::Post;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct PostCardProps {
    pub post: Post,
    pub liked: bool,
    pub on_toggle_like: Callback<()>,
}

#[function_component]
pub fn PostCard(props: &PostCardProps) -> Html {
    let post = &props.post;
    let author = post
        .user
        .as_ref()
        .map(|user| user.full_name())
        .unwrap_or_default();
    let on_like = props.on_toggle_like.reform(|_: MouseEvent| ());
    let like_class = if props.liked {
        "text-red-600"
    } else {
        "text-neutral-500"
    };

    html! {
        <article class="p-4 mb-4 rounded-lg border border-neutral-200">
            <header class="text-sm font-semibold">{author}</header>
            <p class="mt-2 whitespace-pre-wrap">{&post.content}</p>
            if let Some(image) = &post.image {
                <img class="mt-2 rounded-md" src={image.clone()} alt="" />
            }
            <footer class="flex mt-3 space-x-4 text-sm">
                <button onclick={on_like} class={like_class}>
                    {format!("♥ {}", post.count.likes)}
                </button>
                <span class="text-neutral-500">
                    {format!("{} comments", post.count.comments)}
                </span>
            </footer>
        </article>
    }
}

/// Placeholder shown while the first page loads.
#[function_component]
pub fn PostSkeleton() -> Html {
    html! {
        <div class="p-4 mb-4 rounded-lg border border-neutral-200 animate-pulse">
            <div class="h-3 w-1/4 rounded bg-neutral-200"></div>
            <div class="h-3 mt-3 w-3/4 rounded bg-neutral-200"></div>
            <div class="h-3 mt-2 w-1/2 rounded bg-neutral-200"></div>
        </div>
    }
}
