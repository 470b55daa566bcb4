#![forbid(unsafe_code)]

//! End-to-end merge scenarios across a host/document container pair.

use std::cell::RefCell;
use std::rc::Rc;

use ribbon_core::{ContainerId, PagePosition, Surface, SurfaceConfig, SurfaceObserver};
use ribbon_model::{CheckState, ContentMode, GroupDef, ItemDef, PageDef};

#[derive(Debug, Default)]
struct Log {
    loads: Vec<(ContainerId, String)>,
}

struct Recorder(Rc<RefCell<Log>>);

impl SurfaceObserver for Recorder {
    fn load_requested(&mut self, container: ContainerId, page_id: &str, _mode: ContentMode) {
        self.0
            .borrow_mut()
            .loads
            .push((container, page_id.to_string()));
    }
}

fn recorded(surface: &mut Surface) -> Rc<RefCell<Log>> {
    let log = Rc::new(RefCell::new(Log::default()));
    surface.set_observer(Box::new(Recorder(Rc::clone(&log))));
    log
}

fn host_pages() -> Vec<PageDef> {
    vec![
        PageDef::new("home").group(GroupDef::new("clipboard").item(ItemDef::button("paste"))),
        PageDef::new("view").group(GroupDef::new("zoom").item(ItemDef::button("zoom-in"))),
    ]
}

fn document_pages() -> Vec<PageDef> {
    vec![
        PageDef::new("home")
            .group(GroupDef::new("styles").item(ItemDef::toggle("track-changes"))),
        PageDef::new("references").content_mode(ContentMode::OnDemandOnce),
    ]
}

#[test]
fn host_absorbs_document_and_releases_it() {
    let mut surface = Surface::new(SurfaceConfig::default());
    let log = recorded(&mut surface);
    let host = surface.add_container();
    let doc = surface.add_container();
    surface.add_pages(host, host_pages()).unwrap();
    surface.add_pages(doc, document_pages()).unwrap();
    let host_before = surface.container(host).unwrap().pages().to_vec();

    surface.merge(host, doc).unwrap();
    {
        let visible = surface.container(host).unwrap();
        assert_eq!(visible.pages().len(), 3);
        assert_eq!(visible.page("home").unwrap().content_group_count(), 2);
        assert_eq!(
            surface.page_position(host, "references"),
            Some(PagePosition::Merged)
        );
    }

    // First look at the deferred page: exactly one request, owned by the
    // document, raised from the host's visible copy.
    surface.activate_page(host, "references").unwrap();
    surface.activate_page(host, "references").unwrap();
    assert_eq!(log.borrow().loads, vec![(doc, "references".to_string())]);

    surface
        .refill(
            doc,
            vec![PageDef::new("references")
                .group(GroupDef::new("citations").item(ItemDef::button("insert-citation")))],
        )
        .unwrap();
    {
        let refs = surface.container(host).unwrap().page("references").unwrap();
        assert!(refs.group("citations").is_some());
        assert!(refs.marker_group().is_none());
        let owned = surface.container(doc).unwrap().page("references").unwrap();
        assert_eq!(owned.content_mode, ContentMode::Static);
        assert!(owned.token().is_none());
    }

    // Invoking through the aggregate keeps the owning copy in sync.
    let checked = surface.invoke_item(host, "home", "track-changes").unwrap();
    assert_eq!(checked, CheckState::On);
    let owned_item = surface
        .container(doc)
        .unwrap()
        .page("home")
        .unwrap()
        .group("styles")
        .unwrap()
        .find_item("track-changes")
        .unwrap();
    assert_eq!(owned_item.checked, CheckState::On);

    surface.unmerge(host).unwrap();
    let host_after = surface.container(host).unwrap();
    assert_eq!(host_after.pages(), host_before.as_slice());
    assert!(
        surface
            .container(doc)
            .unwrap()
            .page("references")
            .unwrap()
            .group("citations")
            .is_some()
    );
    assert_eq!(log.borrow().loads.len(), 1);
}

#[test]
fn three_level_chain_tears_down_top_first() {
    let mut surface = Surface::new(SurfaceConfig::default());
    let app = surface.add_container();
    let doc = surface.add_container();
    let addin = surface.add_container();
    surface.add_pages(app, host_pages()).unwrap();
    surface.add_pages(doc, document_pages()).unwrap();
    surface
        .add_pages(
            addin,
            vec![PageDef::new("home").group(GroupDef::new("macros").item(ItemDef::button("run")))],
        )
        .unwrap();
    let snapshots: Vec<_> = [app, doc, addin]
        .iter()
        .map(|&cid| surface.container(cid).unwrap().pages().to_vec())
        .collect();

    surface.merge(doc, addin).unwrap();
    surface.merge(app, doc).unwrap();
    assert_eq!(
        surface
            .container(app)
            .unwrap()
            .page("home")
            .unwrap()
            .content_group_count(),
        3
    );

    surface.unmerge(app).unwrap();
    surface.unmerge(doc).unwrap();
    for (&cid, snapshot) in [app, doc, addin].iter().zip(&snapshots) {
        assert_eq!(surface.container(cid).unwrap().pages(), snapshot.as_slice());
        assert_eq!(surface.container(cid).unwrap().merged_child(), None);
        assert_eq!(surface.container(cid).unwrap().merged_into(), None);
    }
}

#[test]
fn switching_documents_swaps_the_projection() {
    let mut surface = Surface::new(SurfaceConfig::default());
    let host = surface.add_container();
    let doc1 = surface.add_container();
    let doc2 = surface.add_container();
    surface.add_pages(host, host_pages()).unwrap();
    surface
        .add_pages(
            doc1,
            vec![PageDef::new("outline").group(GroupDef::new("levels"))],
        )
        .unwrap();
    surface
        .add_pages(
            doc2,
            vec![PageDef::new("sheet").group(GroupDef::new("cells"))],
        )
        .unwrap();
    surface.select_page(doc2, "sheet").unwrap();

    surface.merge(host, doc1).unwrap();
    surface.merge(host, doc2).unwrap();

    let visible = surface.container(host).unwrap();
    assert!(visible.page("sheet").is_some());
    assert!(visible.page("outline").is_none());
    // The incoming document's selection carries over.
    assert_eq!(visible.selected_page(), Some("sheet"));
    assert_eq!(surface.container(doc1).unwrap().merged_into(), None);
}

#[test]
fn clearing_a_merged_document_empties_its_projection() {
    let mut surface = Surface::new(SurfaceConfig::default());
    let host = surface.add_container();
    let doc = surface.add_container();
    surface.add_pages(host, host_pages()).unwrap();
    surface.add_pages(doc, document_pages()).unwrap();
    surface.merge(host, doc).unwrap();

    surface.clear(doc).unwrap();

    let visible = surface.container(host).unwrap();
    assert_eq!(visible.pages().len(), 2);
    assert_eq!(visible.page("home").unwrap().content_group_count(), 1);
    assert!(visible.page("references").is_none());
    // The link survives; an empty document simply contributes nothing.
    assert_eq!(visible.merged_child(), Some(doc));
    assert!(surface.container(doc).unwrap().pages().is_empty());
}
