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

//! Shader program build lifecycle, exercised against a scripted fake backend that
//! keeps the books on every handle the build touches.

use lumo::{
    compile_module, BuildError, GpuContext, ShaderProgramBuilder, ShaderSource, ShaderStage,
};

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

const GOOD_VERTEX: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }\n";
const GOOD_FRAGMENT: &str =
    "#version 330 core\nout vec4 color;\nvoid main() { color = vec4(1.0); }\n";

/// A diagnostic produced by the fake driver.
#[derive(Debug)]
struct FakeDiagnostic(String);

impl fmt::Display for FakeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for FakeDiagnostic {}

/// Books kept by the fake driver.
#[derive(Default)]
struct Ledger {
    next_handle: u32,
    live_modules: BTreeSet<u32>,
    live_programs: BTreeSet<u32>,
    compiled_stages: Vec<ShaderStage>,
    link_calls: u32,
}

/// A fake driver that can be told to reject one stage or the link step.
#[derive(Default)]
struct FakeContext {
    ledger: RefCell<Ledger>,
    reject_stage: Option<ShaderStage>,
    reject_link: bool,
}

impl FakeContext {
    fn rejecting_stage(stage: ShaderStage) -> Self {
        Self {
            reject_stage: Some(stage),
            ..Self::default()
        }
    }

    fn rejecting_link() -> Self {
        Self {
            reject_link: true,
            ..Self::default()
        }
    }

    fn live_modules(&self) -> usize {
        self.ledger.borrow().live_modules.len()
    }

    fn live_programs(&self) -> usize {
        self.ledger.borrow().live_programs.len()
    }

    fn compiled_stages(&self) -> Vec<ShaderStage> {
        self.ledger.borrow().compiled_stages.clone()
    }

    fn link_calls(&self) -> u32 {
        self.ledger.borrow().link_calls
    }
}

impl GpuContext for FakeContext {
    type ShaderModule = u32;
    type ShaderProgram = u32;
    type Error = FakeDiagnostic;

    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::ShaderModule, Self::Error> {
        assert!(!source.trim().is_empty(), "driver handed empty source");

        let mut ledger = self.ledger.borrow_mut();
        ledger.compiled_stages.push(stage);

        if self.reject_stage == Some(stage) {
            return Err(FakeDiagnostic(format!(
                "0:1(1): error: syntax error in {stage} stage"
            )));
        }

        ledger.next_handle += 1;
        let handle = ledger.next_handle;
        ledger.live_modules.insert(handle);
        Ok(handle)
    }

    fn link_program(
        &self,
        vertex: &Self::ShaderModule,
        fragment: &Self::ShaderModule,
    ) -> Result<Self::ShaderProgram, Self::Error> {
        let mut ledger = self.ledger.borrow_mut();
        ledger.link_calls += 1;

        assert!(
            ledger.live_modules.contains(vertex),
            "linked against a destroyed vertex module"
        );
        assert!(
            ledger.live_modules.contains(fragment),
            "linked against a destroyed fragment module"
        );

        if self.reject_link {
            return Err(FakeDiagnostic(
                "error: fragment shader input `vColor` has no matching vertex shader output"
                    .to_owned(),
            ));
        }

        ledger.next_handle += 1;
        let handle = ledger.next_handle;
        ledger.live_programs.insert(handle);
        Ok(handle)
    }

    fn delete_shader_module(&self, module: Self::ShaderModule) {
        assert!(
            self.ledger.borrow_mut().live_modules.remove(&module),
            "module {module} destroyed twice"
        );
    }

    fn delete_program(&self, program: Self::ShaderProgram) {
        assert!(
            self.ledger.borrow_mut().live_programs.remove(&program),
            "program {program} released twice"
        );
    }
}

/// Write the given sources into a temp directory and return their paths.
fn shader_files(vertex: &str, fragment: &str) -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let vertex_path = dir.path().join("demo.vert");
    let fragment_path = dir.path().join("demo.frag");
    fs::write(&vertex_path, vertex).expect("failed to write vertex source");
    fs::write(&fragment_path, fragment).expect("failed to write fragment source");
    (dir, vertex_path, fragment_path)
}

#[test]
fn build_links_a_program_and_frees_both_modules() {
    let (_dir, vertex, fragment) = shader_files(GOOD_VERTEX, GOOD_FRAGMENT);
    let context = FakeContext::default();

    let program = ShaderProgramBuilder::new(&vertex, &fragment)
        .build(&context)
        .expect("build should succeed");

    assert_eq!(context.compiled_stages(), [ShaderStage::Vertex, ShaderStage::Fragment]);
    assert_eq!(context.link_calls(), 1);

    // Modules are gone by the time build returns; the program is not one of them.
    assert_eq!(context.live_modules(), 0);
    assert_eq!(context.live_programs(), 1);
    assert_eq!(*program.raw(), 3, "program handle reuses no module handle");

    program.release(&context);
    assert_eq!(context.live_programs(), 0);
}

#[test]
fn fragment_compile_failure_reports_the_stage_and_leaks_nothing() {
    let (_dir, vertex, fragment) = shader_files(GOOD_VERTEX, "out vec4 color; void main( {}");
    let context = FakeContext::rejecting_stage(ShaderStage::Fragment);

    let err = ShaderProgramBuilder::new(&vertex, &fragment)
        .build(&context)
        .expect_err("fragment stage should be rejected");

    match &err {
        BuildError::Compile { stage, .. } => assert_eq!(*stage, ShaderStage::Fragment),
        other => panic!("expected a compile error, got {other:?}"),
    }

    // The diagnostic log is reachable through the error chain, verbatim.
    let diagnostic = err.source().expect("diagnostic attached").to_string();
    assert!(diagnostic.contains("syntax error"), "got: {diagnostic}");

    // The vertex module compiled first and must not leak; linking never ran.
    assert_eq!(context.compiled_stages(), [ShaderStage::Vertex, ShaderStage::Fragment]);
    assert_eq!(context.link_calls(), 0);
    assert_eq!(context.live_modules(), 0);
    assert_eq!(context.live_programs(), 0);
}

#[test]
fn interface_mismatch_is_a_link_error_not_a_compile_error() {
    let (_dir, vertex, fragment) = shader_files(GOOD_VERTEX, GOOD_FRAGMENT);
    let context = FakeContext::rejecting_link();

    let err = ShaderProgramBuilder::new(&vertex, &fragment)
        .build(&context)
        .expect_err("link should be rejected");

    assert!(matches!(err, BuildError::Link { .. }), "got {err:?}");
    let diagnostic = err.source().expect("diagnostic attached").to_string();
    assert!(diagnostic.contains("no matching vertex shader output"), "got: {diagnostic}");

    // Both stages compiled, the link ran once, and everything was cleaned up.
    assert_eq!(context.compiled_stages(), [ShaderStage::Vertex, ShaderStage::Fragment]);
    assert_eq!(context.link_calls(), 1);
    assert_eq!(context.live_modules(), 0);
    assert_eq!(context.live_programs(), 0);
}

#[test]
fn repeated_builds_yield_independent_programs() {
    let (_dir, vertex, fragment) = shader_files(GOOD_VERTEX, GOOD_FRAGMENT);
    let context = FakeContext::default();
    let builder = ShaderProgramBuilder::new(&vertex, &fragment);

    let first = builder.build(&context).expect("first build");
    let second = builder.build(&context).expect("second build");

    assert_ne!(*first.raw(), *second.raw());
    assert_eq!(context.live_programs(), 2);

    first.release(&context);
    assert_eq!(context.live_programs(), 1, "second program survives the first release");

    second.release(&context);
    assert_eq!(context.live_programs(), 0);
}

#[test]
fn missing_vertex_file_fails_before_any_compilation() {
    let (_dir, _vertex, fragment) = shader_files(GOOD_VERTEX, GOOD_FRAGMENT);
    let context = FakeContext::default();

    let err = ShaderProgramBuilder::new(Path::new("missing.vert"), &fragment)
        .build(&context)
        .expect_err("missing file should fail the build");

    match &err {
        BuildError::Io { stage, path, .. } => {
            assert_eq!(*stage, ShaderStage::Vertex);
            assert_eq!(path, Path::new("missing.vert"));
        }
        other => panic!("expected an io error, got {other:?}"),
    }

    assert!(context.compiled_stages().is_empty(), "no stage may reach the driver");
    assert_eq!(context.link_calls(), 0);
}

#[test]
fn blank_source_file_is_rejected_before_the_driver_sees_it() {
    let (_dir, vertex, fragment) = shader_files("   \n\t\n", GOOD_FRAGMENT);
    let context = FakeContext::default();

    let err = ShaderProgramBuilder::new(&vertex, &fragment)
        .build(&context)
        .expect_err("blank source should fail the build");

    match &err {
        BuildError::EmptySource { stage, path } => {
            assert_eq!(*stage, ShaderStage::Vertex);
            assert_eq!(path, &vertex);
        }
        other => panic!("expected an empty-source error, got {other:?}"),
    }

    assert!(context.compiled_stages().is_empty());
}

#[test]
fn module_guard_destroys_the_handle_on_drop() {
    let context = FakeContext::default();
    let source = ShaderSource::new(ShaderStage::Vertex, GOOD_VERTEX);

    {
        let module = compile_module(&context, &source).expect("compile should succeed");
        assert_eq!(module.stage(), ShaderStage::Vertex);
        assert_eq!(context.live_modules(), 1);
    }

    assert_eq!(context.live_modules(), 0);
}
