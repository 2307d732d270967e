use std::sync::Arc;
use std::thread;

use rootify_core::Segment;
use rootify_store::{StoreError, WordRootStore};

use crate::service::RootService;

fn service_with(roots: &[(&str, &str)]) -> RootService {
    let store = WordRootStore::open_in_memory().expect("in-memory store");
    store.import(roots.iter().copied()).expect("seed roots");
    RootService::new(Arc::new(store))
}

#[test]
fn test_segment_uses_current_roots() {
    let service = service_with(&[("火", "fire"), ("火山", "volcano")]);

    assert_eq!(
        service.segment_text("火山").unwrap(),
        vec![Segment::known("火山", "volcano")]
    );

    service.delete_root("火山").unwrap();

    assert_eq!(
        service.segment_text("火山").unwrap(),
        vec![Segment::known("火", "fire"), Segment::unknown('山')]
    );
}

#[test]
fn test_translate_and_check() {
    let service = service_with(&[("你", "you")]);

    assert_eq!(service.translate_text("你好").unwrap(), "you_好");
    assert!(!service.is_translation_complete("你好").unwrap());

    service.add_root("好", "good").unwrap();

    assert_eq!(service.translate_text("你好").unwrap(), "you_good");
    assert!(service.is_translation_complete("你好").unwrap());
}

#[test]
fn test_engine_snapshot_ignores_later_writes() {
    let service = service_with(&[("你", "you")]);
    let engine = service.engine().unwrap();

    service.add_root("好", "good").unwrap();
    service.add_root("你", "thou").unwrap();

    assert_eq!(engine.translate("你好"), "you_好");
    assert_eq!(service.translate_text("你好").unwrap(), "thou_good");
}

#[test]
fn test_store_errors_propagate() {
    let service = service_with(&[("你", "you")]);
    service.store().close().unwrap();

    assert!(matches!(
        service.segment_text("你"),
        Err(StoreError::StoreUnavailable)
    ));
    assert!(matches!(
        service.translate_text("你"),
        Err(StoreError::StoreUnavailable)
    ));
    assert!(matches!(
        service.is_translation_complete("你"),
        Err(StoreError::StoreUnavailable)
    ));
}

#[test]
fn test_failed_import_leaves_roots_intact() {
    let service = service_with(&[("你", "you")]);
    let before = service.get_all_roots().unwrap();

    let result = service.import_roots([("好", "good"), ("", "nothing")]);

    assert!(matches!(result, Err(StoreError::TransactionAborted { .. })));
    assert_eq!(service.get_all_roots().unwrap(), before);
    assert_eq!(service.translate_text("你好").unwrap(), "you_好");
}

#[test]
fn test_concurrent_translate_and_edit() {
    let service = service_with(&[("你", "you"), ("好", "good")]);

    let editor = {
        let service = service.clone();
        thread::spawn(move || {
            for i in 0..25 {
                service.add_root("吗", if i % 2 == 0 { "huh" } else { "eh" }).unwrap();
                service.delete_root("吗").unwrap();
            }
        })
    };

    let translators: Vec<_> = (0..3)
        .map(|_| {
            let service = service.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    let out = service.translate_text("你好吗").unwrap();
                    assert!(
                        ["you_good_吗", "you_good_huh", "you_good_eh"].contains(&out.as_str()),
                        "unexpected translation {out}"
                    );
                }
            })
        })
        .collect();

    editor.join().unwrap();
    for t in translators {
        t.join().unwrap();
    }
}
