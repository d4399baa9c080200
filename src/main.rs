use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use log::info;
use pollster::FutureExt as _;
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

mod app;
mod backdrop;
mod clock;
mod cloud;
mod color;
mod config;
mod entity;
mod orbital;
mod pointer;
mod renderer;
mod transform_buffer;
mod window;

use app::App;
use config::{Args, Config};

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    let config = Config::from_args(&args)?;
    info!("{:#?}", config);

    let event_loop = EventLoop::new();

    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::<u32> {
            width: config.width,
            height: config.height,
        })
        .build(&event_loop)?;

    let frame_interval = config.frame_interval;
    let mut last_render_inst = Instant::now();

    let mut app = App::new(window, &config).block_on();

    event_loop.run(move |e, _, control_flow| match e {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                app.unmount();
                *control_flow = ControlFlow::Exit;
            }
            WindowEvent::Resized(size) => app.on_resize(size),
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                app.on_resize(*new_inner_size)
            }
            WindowEvent::CursorMoved { position, .. } => app.on_cursor_moved(position),
            _ => (),
        },
        Event::MainEventsCleared => {
            if !app.is_animating() {
                *control_flow = ControlFlow::Wait;
                return;
            }

            let elapsed_from_last_draw = last_render_inst.elapsed();
            if frame_interval > elapsed_from_last_draw {
                let wait = frame_interval - elapsed_from_last_draw;
                *control_flow = ControlFlow::WaitUntil(Instant::now() + wait);
                return;
            }

            app.render();

            last_render_inst = Instant::now();
            *control_flow = ControlFlow::WaitUntil(last_render_inst + frame_interval);
        }
        Event::LoopDestroyed => app.unmount(),
        _ => (),
    });
}
