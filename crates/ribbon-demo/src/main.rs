#![forbid(unsafe_code)]

//! Walkthrough of the merge and deferred-content lifecycle.
//!
//! Builds a host container and a document container, merges them, pulls
//! the document's deferred page in through an activation, and tears the
//! chain down again. Run with `RUST_LOG=debug` to see the structural
//! trace events.

use std::error::Error;

use ribbon_core::{ContainerId, Surface, SurfaceConfig, SurfaceObserver};
use ribbon_model::{CheckState, ContentMode, GroupDef, ItemDef, PageDef};
use tracing_subscriber::EnvFilter;

struct Console;

impl SurfaceObserver for Console {
    fn load_requested(&mut self, container: ContainerId, page_id: &str, mode: ContentMode) {
        println!("  -> load requested for '{page_id}' ({mode:?}) owned by {container}");
    }

    fn command_invoked(&mut self, container: ContainerId, item_id: &str, checked: CheckState) {
        println!("  -> '{item_id}' invoked on {container}, now {checked:?}");
    }
}

fn print_visible(surface: &Surface, cid: ContainerId) -> Result<(), Box<dyn Error>> {
    let container = surface.container(cid)?;
    println!("visible tree of {cid}:");
    for page in container.pages() {
        let marker = if page.marker_group().is_some() {
            " [waiting]"
        } else {
            ""
        };
        println!("  page '{}'{marker}", page.id);
        for group in page.groups.iter().filter(|g| !g.is_marker()) {
            let items: Vec<&str> = group.items.iter().map(|it| it.id.as_str()).collect();
            println!("    group '{}': {}", group.id, items.join(", "));
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut surface = Surface::new(SurfaceConfig::default());
    surface.set_observer(Box::new(Console));

    let host = surface.add_container();
    surface.add_pages(
        host,
        vec![
            PageDef::new("home")
                .text("Home")
                .group(
                    GroupDef::new("clipboard")
                        .item(ItemDef::button("paste").toolbar_order(1))
                        .item(ItemDef::button("copy")),
                )
                .group(GroupDef::new("font").item(ItemDef::toggle("bold"))),
            PageDef::new("view")
                .text("View")
                .group(GroupDef::new("zoom").item(ItemDef::button("zoom-in"))),
        ],
    )?;

    let doc = surface.add_container();
    surface.add_pages(
        doc,
        vec![
            PageDef::new("home")
                .text("Home")
                .group(GroupDef::new("styles").item(ItemDef::toggle("track-changes"))),
            PageDef::new("references")
                .text("References")
                .content_mode(ContentMode::OnDemandOnce),
        ],
    )?;

    println!("== before the merge ==");
    print_visible(&surface, host)?;

    surface.merge(host, doc)?;
    println!("\n== document merged into the host ==");
    print_visible(&surface, host)?;

    println!("\n== activating the deferred page ==");
    surface.activate_page(host, "references")?;
    surface.refill(
        doc,
        vec![
            PageDef::new("references")
                .group(GroupDef::new("citations").item(ItemDef::button("insert-citation"))),
        ],
    )?;
    print_visible(&surface, host)?;

    println!("\n== invoking through the aggregate ==");
    surface.invoke_item(host, "home", "track-changes")?;

    surface.unmerge(host)?;
    println!("\n== document released ==");
    print_visible(&surface, host)?;
    print_visible(&surface, doc)?;

    Ok(())
}
