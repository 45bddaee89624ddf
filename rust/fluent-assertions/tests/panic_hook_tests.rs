use fluent_assertions::*;
use std::{
    panic,
    sync::atomic::{AtomicUsize, Ordering},
};

static HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

#[test]
fn installed_panic_hook_survives_panic_assertions() {
    panic::set_hook(Box::new(|_| {
        HOOK_CALLS.fetch_add(1, Ordering::SeqCst);
    }));

    (|| panic!("boom")).should().panic().with_message("boom");
    (|| 5).should().not_panic();
    HOOK_CALLS.load(Ordering::SeqCst).should().be(0);

    let _ = panic::catch_unwind(|| panic!("after"));
    let _ = panic::take_hook();

    HOOK_CALLS.load(Ordering::SeqCst).should().be(1);
}
