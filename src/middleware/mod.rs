pub mod gate;
pub mod identity;

pub use gate::{access_gate, evaluate, Decision, FormData, GateState, RequestContext, Tier};
pub use identity::resolve_user;
