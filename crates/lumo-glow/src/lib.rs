// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `lumo-glow`.
//
// `lumo-glow` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `lumo-glow` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `lumo-glow`. If not, see <https://www.gnu.org/licenses/>.

//! An OpenGL backend for [`lumo`] that uses the [`glow`] crate.
//!
//! [`glow`]: https://crates.io/crates/glow

use glow::HasContext;

use lumo::{GpuContext, ShaderStage};

use std::fmt;
use std::mem;

/// A wrapper around a [`glow`] context that implements [`GpuContext`].
///
/// The wrapper owns the context; mesh and draw-call code shares it through
/// [`context`](Self::context).
pub struct GlowContext<H: HasContext + ?Sized> {
    context: H,
}

impl<H: HasContext + ?Sized> GlowContext<H> {
    /// Wrap a [`glow`] context.
    ///
    /// Requires OpenGL 3.3 core or OpenGL ES 3.0.
    ///
    /// # Safety
    ///
    /// The context must be current on the calling thread, both now and whenever any
    /// method of this type runs. The driver pins its state to that one thread; this
    /// type never hands the context across threads itself.
    pub unsafe fn new(context: H) -> Result<Self, GlError>
    where
        H: Sized,
    {
        let version = context.version();

        let has_supported_version = if version.is_embedded {
            version.major >= 3
        } else {
            version.major >= 4 || (version.major == 3 && version.minor >= 3)
        };
        if !has_supported_version {
            return Err(GlError(format!(
                "OpenGL 3.3 (or 3.0 ES) or newer is required, got {}.{}",
                version.major, version.minor
            )));
        }

        Ok(Self { context })
    }

    /// Get a reference to the underlying [`glow`] context.
    pub fn context(&self) -> &H {
        &self.context
    }

    /// Unwrap back into the [`glow`] context.
    pub fn into_inner(self) -> H
    where
        H: Sized,
    {
        self.context
    }
}

impl<H: HasContext + ?Sized> fmt::Debug for GlowContext<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowContext").finish_non_exhaustive()
    }
}

impl<H: HasContext + ?Sized> GpuContext for GlowContext<H> {
    type ShaderModule = H::Shader;
    type ShaderProgram = H::Program;
    type Error = GlError;

    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::ShaderModule, Self::Error> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };

        unsafe {
            let shader = self.context.create_shader(shader_type).gl_err()?;
            let delete_on_failure = CallOnDrop(|| self.context.delete_shader(shader));

            self.context.shader_source(shader, source);
            self.context.compile_shader(shader);

            if !self.context.get_shader_compile_status(shader) {
                let log = self.context.get_shader_info_log(shader);
                return Err(GlError(log));
            }

            mem::forget(delete_on_failure);
            tracing::trace!(%stage, "compiled shader");
            Ok(shader)
        }
    }

    fn link_program(
        &self,
        vertex: &Self::ShaderModule,
        fragment: &Self::ShaderModule,
    ) -> Result<Self::ShaderProgram, Self::Error> {
        unsafe {
            let program = self.context.create_program().gl_err()?;
            let delete_on_failure = CallOnDrop(|| self.context.delete_program(program));

            self.context.attach_shader(program, *vertex);
            self.context.attach_shader(program, *fragment);
            self.context.link_program(program);

            // The modules stay owned by the caller; detach on both outcomes so that
            // destroying them later actually frees them.
            self.context.detach_shader(program, *vertex);
            self.context.detach_shader(program, *fragment);

            if !self.context.get_program_link_status(program) {
                let log = self.context.get_program_info_log(program);
                return Err(GlError(log));
            }

            mem::forget(delete_on_failure);
            tracing::trace!("linked program");
            Ok(program)
        }
    }

    fn delete_shader_module(&self, module: Self::ShaderModule) {
        unsafe {
            self.context.delete_shader(module);
        }
    }

    fn delete_program(&self, program: Self::ShaderProgram) {
        unsafe {
            self.context.delete_program(program);
        }
    }
}

/// An error from the OpenGL driver, carrying its diagnostic log verbatim.
#[derive(Debug)]
pub struct GlError(String);

impl GlError {
    /// The driver's diagnostic text.
    pub fn diagnostic(&self) -> &str {
        &self.0
    }
}

impl From<String> for GlError {
    fn from(message: String) -> Self {
        GlError(message)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for GlError {}

trait ResultExt<T, E> {
    fn gl_err(self) -> Result<T, GlError>;
}

impl<T, E: Into<GlError>> ResultExt<T, E> for Result<T, E> {
    fn gl_err(self) -> Result<T, GlError> {
        self.map_err(Into::into)
    }
}

struct CallOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}
