// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: image loading, region export and image records.

pub mod export;
pub mod media;
pub mod serialization;
