// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Editing, validation and inventory logic, free of any UI code.

pub mod errors;
pub mod inventory;
pub mod owner;
pub mod search;
pub mod validation;
