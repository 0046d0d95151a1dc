//! AmoCover application library: the modules mounted by the server binary.

// the covers OpenAPI fragment is one large `json!` literal
#![recursion_limit = "256"]

pub mod modules;
