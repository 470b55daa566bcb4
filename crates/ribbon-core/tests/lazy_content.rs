#![forbid(unsafe_code)]

//! Deferred-content lifecycles observed across merge chains.

use std::cell::RefCell;
use std::rc::Rc;

use ribbon_core::{ContainerId, Surface, SurfaceConfig, SurfaceObserver};
use ribbon_model::{ContentMode, GroupDef, ItemDef, PageDef};

#[derive(Debug, Default)]
struct Log {
    loads: Vec<(ContainerId, String, ContentMode)>,
}

struct Recorder(Rc<RefCell<Log>>);

impl SurfaceObserver for Recorder {
    fn load_requested(&mut self, container: ContainerId, page_id: &str, mode: ContentMode) {
        self.0
            .borrow_mut()
            .loads
            .push((container, page_id.to_string(), mode));
    }
}

fn recorded(surface: &mut Surface) -> Rc<RefCell<Log>> {
    let log = Rc::new(RefCell::new(Log::default()));
    surface.set_observer(Box::new(Recorder(Rc::clone(&log))));
    log
}

#[test]
fn once_page_requests_a_single_load_through_the_chain() {
    let mut surface = Surface::new(SurfaceConfig::default());
    let log = recorded(&mut surface);
    let host = surface.add_container();
    let doc = surface.add_container();
    surface
        .add_pages(
            host,
            vec![PageDef::new("home").group(GroupDef::new("clipboard"))],
        )
        .unwrap();
    surface
        .add_pages(
            doc,
            vec![PageDef::new("refs").content_mode(ContentMode::OnDemandOnce)],
        )
        .unwrap();
    surface.merge(host, doc).unwrap();

    surface.activate_page(host, "refs").unwrap();
    surface.activate_page(host, "refs").unwrap();
    assert_eq!(
        log.borrow().loads,
        vec![(doc, "refs".to_string(), ContentMode::OnDemandOnce)]
    );

    surface
        .refill(
            doc,
            vec![PageDef::new("refs").group(GroupDef::new("citations"))],
        )
        .unwrap();
    surface.activate_page(host, "refs").unwrap();
    assert_eq!(log.borrow().loads.len(), 1);
    assert!(
        surface
            .container(host)
            .unwrap()
            .page("refs")
            .unwrap()
            .group("citations")
            .is_some()
    );
}

#[test]
fn every_time_page_requests_on_each_activation() {
    let mut surface = Surface::new(SurfaceConfig::default());
    let log = recorded(&mut surface);
    let host = surface.add_container();
    let doc = surface.add_container();
    surface
        .add_pages(
            host,
            vec![PageDef::new("home").group(GroupDef::new("clipboard"))],
        )
        .unwrap();
    surface
        .add_pages(
            doc,
            vec![PageDef::new("live").content_mode(ContentMode::OnDemandEveryTime)],
        )
        .unwrap();
    surface.merge(host, doc).unwrap();

    for round in 1..=3usize {
        surface.activate_page(host, "live").unwrap();
        assert_eq!(log.borrow().loads.len(), round);
        surface
            .refill(
                doc,
                vec![PageDef::new("live").group(GroupDef::new(format!("feed-{round}")))],
            )
            .unwrap();
    }
    // The token never retires, so the cycle can continue indefinitely.
    assert!(
        surface
            .container(doc)
            .unwrap()
            .page("live")
            .unwrap()
            .token()
            .is_some()
    );
}

#[test]
fn withheld_static_content_resolves_silently_on_activation() {
    let mut surface = Surface::new(SurfaceConfig::new().lazy_static_content(true));
    let log = recorded(&mut surface);
    let host = surface.add_container();
    let doc = surface.add_container();
    surface
        .add_pages(
            host,
            vec![PageDef::new("home").group(GroupDef::new("clipboard"))],
        )
        .unwrap();
    surface
        .add_pages(
            doc,
            vec![PageDef::new("draw").group(GroupDef::new("pens").item(ItemDef::button("ink")))],
        )
        .unwrap();
    surface.merge(host, doc).unwrap();
    assert_eq!(
        surface
            .container(host)
            .unwrap()
            .page("draw")
            .unwrap()
            .content_group_count(),
        0
    );

    surface.activate_page(host, "draw").unwrap();

    assert!(log.borrow().loads.is_empty());
    let visible = surface.container(host).unwrap().page("draw").unwrap();
    assert_eq!(visible.content_group_count(), 1);
    assert!(visible.marker_group().is_none());
    let owned = surface.container(doc).unwrap().page("draw").unwrap();
    assert!(owned.token().is_none());
    assert_eq!(owned.content_mode, ContentMode::Static);
}

#[test]
fn deleting_a_waiting_page_retires_its_token() {
    let mut surface = Surface::new(SurfaceConfig::default());
    let log = recorded(&mut surface);
    let main = surface.add_container();
    surface
        .add_pages(
            main,
            vec![
                PageDef::new("home").group(GroupDef::new("clipboard")),
                PageDef::new("refs").content_mode(ContentMode::OnDemandOnce),
            ],
        )
        .unwrap();
    // Deleting the owning page while a load is outstanding retires the
    // token; the next activation has nothing left to request.
    surface.activate_page(main, "refs").unwrap();
    surface.refill(main, vec![PageDef::new("refs")]).unwrap();
    assert!(surface.container(main).unwrap().page("refs").is_none());

    surface.activate_page(main, "refs").unwrap();
    assert_eq!(log.borrow().loads.len(), 1);
}
