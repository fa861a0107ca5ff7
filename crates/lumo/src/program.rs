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

//! The build pipeline from shader source files to a linked program.

use super::gpu_backend::{GpuContext, ShaderStage};
use super::resources::{ShaderModule, ShaderProgram};

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Stage-tagged shader source text.
///
/// The text is read once and discarded after compilation; nothing here touches the
/// GPU yet.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    stage: ShaderStage,
    text: String,
    path: Option<PathBuf>,
}

impl ShaderSource {
    /// Wrap in-memory source text for the given stage.
    pub fn new(stage: ShaderStage, text: impl Into<String>) -> Self {
        Self {
            stage,
            text: text.into(),
            path: None,
        }
    }

    /// Read source text for the given stage from a file.
    ///
    /// The read is a blocking whole-file read. An unreadable path fails with
    /// [`BuildError::Io`] and a file with no actual content fails with
    /// [`BuildError::EmptySource`]; in both cases no driver work has happened yet.
    pub fn from_path(stage: ShaderStage, path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();

        let text = fs::read_to_string(path).map_err(|source| BuildError::Io {
            stage,
            path: path.to_path_buf(),
            source,
        })?;

        if text.trim().is_empty() {
            return Err(BuildError::EmptySource {
                stage,
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            stage,
            text,
            path: Some(path.to_path_buf()),
        })
    }

    /// The stage this source is meant for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The file this source was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Compile a single module out of stage-tagged source text.
///
/// The returned guard destroys the module handle when it goes out of scope.
pub fn compile_module<'a, C: GpuContext + ?Sized>(
    context: &'a C,
    source: &ShaderSource,
) -> Result<ShaderModule<'a, C>, BuildError> {
    let raw = context
        .compile_shader(source.stage(), source.text())
        .map_err(|err| BuildError::Compile {
            stage: source.stage(),
            source: Box::new(err),
        })?;

    tracing::debug!(stage = %source.stage(), "compiled shader module");

    Ok(ShaderModule::from_raw(context, source.stage(), raw))
}

/// Builds a two-stage shader program out of a vertex and a fragment source file.
///
/// This is a single linear pipeline: read both files, compile both modules, link.
/// Any failure aborts the build and propagates; there is no retry and no fallback
/// source. The intermediate module handles are destroyed before `build` returns,
/// whether linking succeeded or not.
///
/// # Examples
///
/// ```no_run
/// # fn demo<C: lumo::GpuContext>(context: &C) -> Result<(), lumo::BuildError> {
/// let program = lumo::ShaderProgramBuilder::new("shaders/solid.vert", "shaders/solid.frag")
///     .build(context)?;
/// // ... bind `program.raw()` each frame ...
/// program.release(context);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ShaderProgramBuilder {
    vertex_path: PathBuf,
    fragment_path: PathBuf,
}

impl ShaderProgramBuilder {
    /// Set up a build from the two stage source files.
    pub fn new(vertex_path: impl Into<PathBuf>, fragment_path: impl Into<PathBuf>) -> Self {
        Self {
            vertex_path: vertex_path.into(),
            fragment_path: fragment_path.into(),
        }
    }

    /// Run the build against the given context.
    ///
    /// On success the caller owns the returned program until it explicitly
    /// [releases](ShaderProgram::release) it. Building twice yields two independent
    /// programs; releasing one does not affect the other.
    pub fn build<C: GpuContext + ?Sized>(
        &self,
        context: &C,
    ) -> Result<ShaderProgram<C>, BuildError> {
        tracing::debug!(
            vertex = %self.vertex_path.display(),
            fragment = %self.fragment_path.display(),
            "building shader program"
        );

        // Both reads happen before any driver call, so a missing file never
        // leaves a half-compiled pair behind.
        let vertex_source = ShaderSource::from_path(ShaderStage::Vertex, &self.vertex_path)?;
        let fragment_source = ShaderSource::from_path(ShaderStage::Fragment, &self.fragment_path)?;

        let vertex = compile_module(context, &vertex_source)?;
        let fragment = compile_module(context, &fragment_source)?;

        let raw = context
            .link_program(vertex.raw(), fragment.raw())
            .map_err(|err| BuildError::Link {
                source: Box::new(err),
            })?;

        tracing::debug!("linked shader program");

        // `vertex` and `fragment` drop here; the guards also run on every early
        // return above, so the module handles never outlive the build.
        Ok(ShaderProgram::from_raw(raw))
    }
}

/// Build a shader program from a vertex and a fragment source file.
///
/// Convenience for a one-shot [`ShaderProgramBuilder`].
pub fn build_program<C: GpuContext + ?Sized>(
    context: &C,
    vertex_path: impl AsRef<Path>,
    fragment_path: impl AsRef<Path>,
) -> Result<ShaderProgram<C>, BuildError> {
    ShaderProgramBuilder::new(vertex_path.as_ref(), fragment_path.as_ref()).build(context)
}

/// Why a shader program build failed.
///
/// None of these are recovered locally; every failure propagates to the caller with
/// the driver's diagnostic reachable through [`source`](StdError::source), so the
/// host can report it and bail out.
#[derive(Debug)]
pub enum BuildError {
    /// A source file could not be read.
    Io {
        /// The stage the file was meant for.
        stage: ShaderStage,
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying read error.
        source: io::Error,
    },

    /// A source file had no content to compile.
    EmptySource {
        /// The stage the file was meant for.
        stage: ShaderStage,
        /// The path of the empty file.
        path: PathBuf,
    },

    /// The driver rejected the source of one stage.
    Compile {
        /// The stage that failed to compile.
        stage: ShaderStage,
        /// The backend error carrying the compile diagnostic log.
        source: Box<dyn StdError + 'static>,
    },

    /// Both stages compiled but the driver rejected the pair at link time.
    Link {
        /// The backend error carrying the link diagnostic log.
        source: Box<dyn StdError + 'static>,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Io { stage, path, .. } => {
                write!(
                    f,
                    "failed to read {} shader source from {}",
                    stage,
                    path.display()
                )
            }
            BuildError::EmptySource { stage, path } => {
                write!(f, "{} shader source {} is empty", stage, path.display())
            }
            BuildError::Compile { stage, .. } => {
                write!(f, "failed to compile {stage} shader module")
            }
            BuildError::Link { .. } => f.write_str("failed to link shader program"),
        }
    }
}

impl StdError for BuildError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            BuildError::Io { source, .. } => Some(source),
            BuildError::EmptySource { .. } => None,
            BuildError::Compile { source, .. } | BuildError::Link { source } => {
                Some(source.as_ref())
            }
        }
    }
}
