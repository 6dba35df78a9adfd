use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, div, "bg-card text-card-foreground flex flex-col gap-3 rounded-xl border py-4 shadow-sm"}
    clx! {CardHeader, div, "flex items-center justify-between gap-2 px-4"}
    clx! {CardTitle, h2, "leading-none font-semibold"}
    clx! {CardContent, div, "px-4"}
    clx! {CardList, ul, "flex flex-col gap-1"}
    clx! {CardItem, li, "flex items-center gap-2 rounded-md px-2 py-1.5 hover:bg-muted/50 [&_svg:not([class*='size-'])]:size-4 [&_svg]:shrink-0"}
}

pub use components::*;
