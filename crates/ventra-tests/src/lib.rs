// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # ventra-tests
//!
//! Integration tests and shared fixtures for the VENTRA workspace. The
//! mock transport and catalog fixtures live in [`common`]; the scenario
//! tests live under `tests/`.

pub mod common;

pub use common::fixtures;
pub use common::mocks::{MockHandle, MockTransport};
