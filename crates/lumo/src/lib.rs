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

//! Compiling and linking GPU shader programs, independent of the graphics API underneath.
//!
//! Every shader-based renderer starts the same way: read two source files, compile a
//! vertex and a fragment module, link them into a program, and clean up the intermediate
//! handles. This crate owns exactly that lifecycle and nothing else. The actual driver
//! calls live behind the [`GpuContext`] trait, which a backend implements on top of its
//! graphics API (see the companion `lumo-glow` crate for an OpenGL implementation).
//!
//! To use, implement [`GpuContext`] for a type representing an active graphics context,
//! then point a [`ShaderProgramBuilder`] at a vertex and a fragment source file and call
//! [`build`](ShaderProgramBuilder::build). The returned [`ShaderProgram`] is yours to
//! bind every frame and to [`release`](ShaderProgram::release) at shutdown. Intermediate
//! [`ShaderModule`] handles are scope guards and never outlive the build, no matter which
//! path it exits through.
//!
//! Note that this crate uses thread-unsafe primitives throughout. Graphics contexts are
//! pinned to one thread by the APIs underneath anyway, and nothing here suspends, retries,
//! or falls back: a build either completes or fails with the driver's diagnostic attached.

#![forbid(unsafe_code, rust_2018_idioms)]

mod gpu_backend;
mod program;
mod resources;

pub use self::gpu_backend::{GpuContext, ShaderStage};
pub use self::program::{build_program, compile_module, BuildError, ShaderProgramBuilder, ShaderSource};
pub use self::resources::{ShaderModule, ShaderProgram};
