// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain layer: pure data types shared between UI and inventory logic.

pub mod fields;
pub mod record;
pub mod tags;
