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

//! A colored triangle, drawn with a program built from the shader files on disk.

#[path = "util/setup_context.rs"]
mod util;

use bytemuck::{Pod, Zeroable};
use glow::HasContext;

use lumo::{ShaderProgram, ShaderProgramBuilder};
use lumo_glow::GlowContext;

use std::error::Error;
use std::mem;
use std::path::Path;

/// Interleaved position + color, 16 bytes per vertex.
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
struct Vertex {
    position: [f32; 3],
    color: [u8; 4],
}

const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [-0.75, -0.75, 0.0],
        color: [237, 41, 57, 255],
    },
    Vertex {
        position: [0.75, -0.75, 0.0],
        color: [41, 237, 57, 255],
    },
    Vertex {
        position: [0.0, 0.75, 0.0],
        color: [41, 57, 237, 255],
    },
];

struct Scene {
    program: ShaderProgram<GlowContext<glow::Context>>,
    vao: glow::NativeVertexArray,
    vbo: glow::NativeBuffer,
}

fn main() -> Result<(), Box<dyn Error>> {
    util::init();
    util::run_app("lumo triangle", setup, frame, teardown)
}

fn setup(gl: &GlowContext<glow::Context>) -> Result<Scene, Box<dyn Error>> {
    let shaders = Path::new(env!("CARGO_MANIFEST_DIR")).join("examples/shaders");
    let program = ShaderProgramBuilder::new(shaders.join("solid.vert"), shaders.join("solid.frag"))
        .build(gl)?;

    let context = gl.context();
    unsafe {
        context.clear_color(0.1, 0.4, 0.2, 1.0);

        let vao = context.create_vertex_array()?;
        let vbo = context.create_buffer()?;

        context.bind_vertex_array(Some(vao));
        context.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        context.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(&TRIANGLE),
            glow::STATIC_DRAW,
        );

        let stride = mem::size_of::<Vertex>() as i32;
        context.enable_vertex_attrib_array(0);
        context.vertex_attrib_pointer_f32(
            0,
            3,
            glow::FLOAT,
            false,
            stride,
            bytemuck::offset_of!(Vertex, position) as i32,
        );
        context.enable_vertex_attrib_array(1);
        context.vertex_attrib_pointer_f32(
            1,
            4,
            glow::UNSIGNED_BYTE,
            true,
            stride,
            bytemuck::offset_of!(Vertex, color) as i32,
        );

        context.bind_vertex_array(None);
        context.bind_buffer(glow::ARRAY_BUFFER, None);

        Ok(Scene { program, vao, vbo })
    }
}

fn frame(gl: &GlowContext<glow::Context>, scene: &mut Scene) {
    let context = gl.context();
    unsafe {
        context.clear(glow::COLOR_BUFFER_BIT);

        context.use_program(Some(*scene.program.raw()));
        context.bind_vertex_array(Some(scene.vao));
        context.draw_arrays(glow::TRIANGLES, 0, 3);
        context.bind_vertex_array(None);
        context.use_program(None);
    }
}

fn teardown(gl: &GlowContext<glow::Context>, scene: Scene) {
    let context = gl.context();
    unsafe {
        context.delete_buffer(scene.vbo);
        context.delete_vertex_array(scene.vao);
    }
    scene.program.release(gl);
}
