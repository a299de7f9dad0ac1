// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget reply generation.

use crate::types::ReplyHandle;

/// Starts generating a reply for a pending query.
///
/// `request` is called while the sign is waiting for its next frame, so it
/// must return immediately. Results come back later as
/// [`ReplyEvent`](crate::types::ReplyEvent)s carrying the same handle.
pub trait ReplyRequester: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn request(&self, handle: ReplyHandle);
}
