//! Workspace root package (no library surface; carries lints/profile settings and the cargo-husky dev-hook).
