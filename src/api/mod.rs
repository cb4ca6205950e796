// =============================================================================
// Dashboard API
// =============================================================================
//
// - rest: JSON endpoints under `/api/v1/`
// - ws:   push feed of dashboard snapshots
// - auth: bearer-token extractor for control endpoints

pub mod auth;
pub mod rest;
pub mod ws;
