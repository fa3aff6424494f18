use rust_optics_common::{CommonError, DoubleUpdate, DoubleUpdateEvent, SignedUpdate, Update};

alloy::sol! {
    #[allow(clippy::too_many_arguments)]
    #[sol(rpc)]
    TestCommon, concat!(env!("CARGO_MANIFEST_DIR"), "/src/generated/abi/TestCommon.json"),
}

impl From<TestCommon::Update> for SignedUpdate {
    fn from(event: TestCommon::Update) -> Self {
        SignedUpdate::new(
            Update::new(event.homeDomain, event.oldRoot, event.newRoot),
            event.signature,
        )
    }
}

impl From<TestCommon::DoubleUpdate> for DoubleUpdateEvent {
    fn from(event: TestCommon::DoubleUpdate) -> Self {
        DoubleUpdateEvent {
            old_root: event.oldRoot,
            new_root: event.newRoot,
            signature: event.signature,
            signature2: event.signature2,
        }
    }
}

/// Rebuilds the proof carried by a `DoubleUpdate` event. The event does not
/// carry the home domain, so it has to be supplied.
pub fn double_update_from_event(
    home_domain: u32,
    event: TestCommon::DoubleUpdate,
) -> Result<DoubleUpdate, CommonError> {
    DoubleUpdate::from_parts(
        home_domain,
        event.oldRoot,
        event.newRoot,
        event.signature,
        event.signature2,
    )
}
