// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: regions, per-image history, label series and the session.

pub mod annotation;
pub mod history;
pub mod labels;
pub mod session;
