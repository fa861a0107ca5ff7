// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `lumo`.
//
// `lumo` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `lumo` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `lumo`. If not, see <https://www.gnu.org/licenses/>.

//! Ownership wrappers for the handles a [`GpuContext`] hands out.

use super::gpu_backend::{GpuContext, ShaderStage};

use std::fmt;

/// A compiled, unlinked shader module, scoped to the borrow of its context.
///
/// The underlying handle is destroyed when this guard drops, on every exit path.
/// A module is only an intermediate step towards a linked program; once linking
/// has happened (or failed), the handle has served its purpose either way.
pub struct ShaderModule<'a, C: GpuContext + ?Sized> {
    context: &'a C,
    stage: ShaderStage,
    raw: Option<C::ShaderModule>,
}

impl<'a, C: GpuContext + ?Sized> ShaderModule<'a, C> {
    pub(crate) fn from_raw(context: &'a C, stage: ShaderStage, raw: C::ShaderModule) -> Self {
        Self {
            context,
            stage,
            raw: Some(raw),
        }
    }

    /// The stage this module was compiled for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The backend handle for this module.
    pub fn raw(&self) -> &C::ShaderModule {
        // Populated at construction and only taken out in `drop`.
        self.raw.as_ref().unwrap()
    }
}

impl<C: GpuContext + ?Sized> fmt::Debug for ShaderModule<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderModule")
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl<C: GpuContext + ?Sized> Drop for ShaderModule<'_, C> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            self.context.delete_shader_module(raw);
        }
    }
}

/// A linked, executable shader program.
///
/// Unlike [`ShaderModule`], this does not borrow the context: the program is owned
/// by the host application from creation until shutdown, typically bound every frame
/// in between. Destruction is explicit via [`release`](Self::release); the handle is
/// invalid for use afterwards.
pub struct ShaderProgram<C: GpuContext + ?Sized> {
    raw: C::ShaderProgram,
}

impl<C: GpuContext + ?Sized> ShaderProgram<C> {
    pub(crate) fn from_raw(raw: C::ShaderProgram) -> Self {
        Self { raw }
    }

    /// The backend handle, for binding the program as the active pipeline.
    pub fn raw(&self) -> &C::ShaderProgram {
        &self.raw
    }

    /// Destroy the program.
    pub fn release(self, context: &C) {
        context.delete_program(self.raw);
    }
}

impl<C: GpuContext + ?Sized> fmt::Debug for ShaderProgram<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram").finish_non_exhaustive()
    }
}
