// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the ROICROP application.

pub mod canvas;
pub mod labels;
pub mod pointer;
pub mod toolbar;
