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

//! Defines the GPU backend that shader programs are built against.

use std::error::Error;
use std::fmt;

/// A single stage of the programmable pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The per-vertex stage.
    Vertex,

    /// The per-fragment stage.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// The driver-facing side of shader program building.
///
/// This is the capability object that a backend implements on top of its graphics API.
/// The original pattern of a process-global "current context" is deliberately absent;
/// every operation takes the context explicitly, so the thread-affinity contract of the
/// underlying API stays visible at the call site.
///
/// Handles returned by this trait are plain values with no destructor of their own.
/// Ownership discipline is layered on top by [`ShaderModule`] and [`ShaderProgram`].
///
/// [`ShaderModule`]: crate::ShaderModule
/// [`ShaderProgram`]: crate::ShaderProgram
pub trait GpuContext {
    /// A compiled, unlinked single-stage program unit.
    type ShaderModule;

    /// A linked, executable multi-stage program.
    type ShaderProgram;

    /// The error type associated with this GPU context.
    ///
    /// For compile and link failures the `Display` output must carry the driver's
    /// diagnostic log verbatim; callers report it without further interpretation.
    type Error: Error + 'static;

    /// Compile shader source text for the given stage.
    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::ShaderModule, Self::Error>;

    /// Link a vertex and a fragment module into one executable program.
    ///
    /// A program object allocated for a link that then fails must not leak; that
    /// cleanup is the backend's responsibility. The modules themselves stay owned
    /// by the caller on every path.
    fn link_program(
        &self,
        vertex: &Self::ShaderModule,
        fragment: &Self::ShaderModule,
    ) -> Result<Self::ShaderProgram, Self::Error>;

    /// Destroy a shader module handle.
    fn delete_shader_module(&self, module: Self::ShaderModule);

    /// Destroy a shader program handle.
    fn delete_program(&self, program: Self::ShaderProgram);
}

impl<C: GpuContext + ?Sized> GpuContext for &C {
    type ShaderModule = C::ShaderModule;
    type ShaderProgram = C::ShaderProgram;
    type Error = C::Error;

    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::ShaderModule, Self::Error> {
        (**self).compile_shader(stage, source)
    }

    fn link_program(
        &self,
        vertex: &Self::ShaderModule,
        fragment: &Self::ShaderModule,
    ) -> Result<Self::ShaderProgram, Self::Error> {
        (**self).link_program(vertex, fragment)
    }

    fn delete_shader_module(&self, module: Self::ShaderModule) {
        (**self).delete_shader_module(module)
    }

    fn delete_program(&self, program: Self::ShaderProgram) {
        (**self).delete_program(program)
    }
}
