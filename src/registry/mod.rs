// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Registry Module
 * Source registry by name
 * © 2026 Bountyy Oy
 */

pub mod finder_registry;

pub use finder_registry::{FinderFactory, FinderRegistry, FINDER_REGISTRY};
