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

// Shared window/context bootstrap for the demo apps. Uses glutin + winit; each demo
// only supplies scene setup, a frame callback and teardown.

use lumo_glow::GlowContext;

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentContext, PossiblyCurrentContext,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};

use raw_window_handle::HasRawWindowHandle;

use std::error::Error;
use std::mem;
use std::num::NonZeroU32;

use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

pub(crate) const SCREEN_WIDTH: u32 = 640;
pub(crate) const SCREEN_HEIGHT: u32 = 480;

pub(crate) fn init() {
    tracing_subscriber::fmt::init();
}

/// Drive a demo: open the window, bring up GL, then hand control to the callbacks.
///
/// `setup` runs once with a current context, `frame` runs every redraw, and
/// `teardown` runs before the loop exits, on window close or Escape. A setup
/// failure is fatal: the diagnostic chain is logged and the process exits.
pub(crate) fn run_app<S, Setup, Frame, Teardown>(
    title: &'static str,
    setup: Setup,
    frame: Frame,
    teardown: Teardown,
) -> Result<(), Box<dyn Error>>
where
    S: 'static,
    Setup: FnOnce(&GlowContext<glow::Context>) -> Result<S, Box<dyn Error>> + 'static,
    Frame: FnMut(&GlowContext<glow::Context>, &mut S) + 'static,
    Teardown: FnOnce(&GlowContext<glow::Context>, S) + 'static,
{
    let event_loop = EventLoop::new();
    let mut glutin = GlutinSetup::new(&event_loop, title)?;

    let mut setup = Some(setup);
    let mut teardown = Some(teardown);
    let mut frame = frame;
    let mut app: Option<(GlowContext<glow::Context>, S)> = None;
    let mut cursor = PhysicalPosition::new(0.0f64, 0.0);

    event_loop.run(move |event, window_target, control_flow| {
        control_flow.set_poll();

        match event {
            Event::Resumed => {
                if app.is_some() {
                    return;
                }

                let context = glutin.make_current(window_target);

                // SAFETY: `make_current` just made the context current on this
                // thread, and the event loop never leaves it.
                let gl = match unsafe { GlowContext::new(context) } {
                    Ok(gl) => gl,
                    Err(err) => fatal(&err),
                };

                match (setup.take().expect("resumed twice"))(&gl) {
                    Ok(scene) => app = Some((gl, scene)),
                    Err(err) => fatal(err.as_ref()),
                }
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => glutin.resize(size),
                WindowEvent::CloseRequested => {
                    shutdown(&mut app, &mut teardown);
                    control_flow.set_exit();
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => {
                    tracing::info!(?key, "key pressed");
                    if key == VirtualKeyCode::Escape {
                        shutdown(&mut app, &mut teardown);
                        control_flow.set_exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => cursor = position,
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => {
                    let action = match state {
                        ElementState::Pressed => "pressed",
                        ElementState::Released => "released",
                    };
                    tracing::info!(x = cursor.x, y = cursor.y, "left mouse button {action}");
                }
                _ => (),
            },
            Event::RedrawEventsCleared => {
                if let Some((gl, scene)) = app.as_mut() {
                    frame(gl, scene);
                    glutin.swap_buffers();
                }
            }
            _ => (),
        }
    })
}

fn shutdown<S, Teardown>(
    app: &mut Option<(GlowContext<glow::Context>, S)>,
    teardown: &mut Option<Teardown>,
) where
    Teardown: FnOnce(&GlowContext<glow::Context>, S),
{
    if let Some((gl, scene)) = app.take() {
        if let Some(teardown) = teardown.take() {
            teardown(&gl, scene);
        }
    }
}

fn fatal(err: &(dyn Error + 'static)) -> ! {
    let mut report = err.to_string();
    let mut cause = err.source();
    while let Some(err) = cause {
        report.push_str(": ");
        report.push_str(&err.to_string());
        cause = err.source();
    }

    tracing::error!("{report}");
    std::process::exit(1);
}

pub(crate) struct GlutinSetup {
    display: Display,
    config: Config,
    context: ContextState,
    window: Option<Window>,
    title: &'static str,
}

enum ContextState {
    NotCurrent(NotCurrentContext),
    Current {
        context: PossiblyCurrentContext,
        surface: Surface<WindowSurface>,
        window: Window,
    },
    Taken,
}

impl Default for ContextState {
    fn default() -> Self {
        Self::Taken
    }
}

fn window_builder(title: &'static str) -> WindowBuilder {
    WindowBuilder::new()
        .with_title(title)
        .with_inner_size(LogicalSize::new(SCREEN_WIDTH, SCREEN_HEIGHT))
}

impl GlutinSetup {
    pub(crate) fn new(
        event_loop: &EventLoop<()>,
        title: &'static str,
    ) -> Result<Self, Box<dyn Error>> {
        // Windows wants the window before the display; everywhere else it is
        // finalized once the config is known.
        let window = cfg!(windows).then(|| window_builder(title));

        let (window, config) = DisplayBuilder::new().with_window_builder(window).build(
            event_loop,
            ConfigTemplateBuilder::new(),
            |mut configs| configs.next().expect("no usable GL config"),
        )?;

        let window_handle = window.as_ref().map(|w| w.raw_window_handle());
        let display = config.display();

        // Ask for desktop GL first, then fall back to GLES.
        let attempts = [
            ContextAttributesBuilder::new().build(window_handle),
            ContextAttributesBuilder::new()
                .with_context_api(ContextApi::Gles(None))
                .build(window_handle),
        ];

        let mut context = None;
        for attrs in &attempts {
            if let Ok(created) = unsafe { display.create_context(&config, attrs) } {
                context = Some(created);
                break;
            }
        }
        let context = context.ok_or("could not create a GL context")?;

        Ok(Self {
            display,
            config,
            context: ContextState::NotCurrent(context),
            window,
            title,
        })
    }

    pub(crate) fn make_current(
        &mut self,
        window_target: &EventLoopWindowTarget<()>,
    ) -> glow::Context {
        let window = self.window.take().unwrap_or_else(|| {
            glutin_winit::finalize_window(window_target, window_builder(self.title), &self.config)
                .expect("failed to create window")
        });

        let attrs = window.build_surface_attributes(<_>::default());
        let surface = unsafe {
            self.display
                .create_window_surface(&self.config, &attrs)
                .expect("failed to create window surface")
        };

        let context = match mem::take(&mut self.context) {
            ContextState::NotCurrent(context) => context
                .make_current(&surface)
                .expect("failed to make the context current"),
            _ => panic!("context already current"),
        };

        if let Err(err) =
            surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::new(1).unwrap()))
        {
            tracing::warn!("could not enable vsync: {err:?}");
        }

        let glow_context = unsafe {
            glow::Context::from_loader_function_cstr(|name| {
                self.display.get_proc_address(name) as *const _
            })
        };

        #[cfg(not(target_vendor = "apple"))]
        unsafe {
            use glow::HasContext;

            glow_context.enable(glow::DEBUG_OUTPUT);
            glow_context.debug_message_callback(debug_message_callback);
        }

        self.context = ContextState::Current {
            context,
            surface,
            window,
        };

        glow_context
    }

    pub(crate) fn resize(&self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }

        if let ContextState::Current {
            context, surface, ..
        } = &self.context
        {
            surface.resize(
                context,
                NonZeroU32::new(size.width).unwrap(),
                NonZeroU32::new(size.height).unwrap(),
            );
        }
    }

    pub(crate) fn swap_buffers(&self) {
        if let ContextState::Current {
            context,
            surface,
            window,
        } = &self.context
        {
            window.request_redraw();
            surface.swap_buffers(context).expect("failed to swap buffers");
        }
    }
}

#[cfg(not(target_vendor = "apple"))]
fn debug_message_callback(source: u32, ty: u32, id: u32, severity: u32, message: &str) {
    match severity {
        glow::DEBUG_SEVERITY_HIGH => tracing::error!("GL {source:#x}/{ty:#x}-{id}: {message}"),
        glow::DEBUG_SEVERITY_MEDIUM => tracing::warn!("GL {source:#x}/{ty:#x}-{id}: {message}"),
        glow::DEBUG_SEVERITY_LOW => tracing::info!("GL {source:#x}/{ty:#x}-{id}: {message}"),
        _ => tracing::debug!("GL {source:#x}/{ty:#x}-{id}: {message}"),
    }
}
