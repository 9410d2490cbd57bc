use std::sync::Arc;

use anyhow::Result;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::render::Render;

pub trait AppLoop {
    /// Called once per redraw. An error stops the event loop.
    fn draw(&mut self) -> Result<()>;

    fn resize(&mut self, _size: PhysicalSize<u32>) {}
}

pub struct App {
    title: String,
    width: u32,
    height: u32,
}

impl App {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Opens the window and runs until it's closed or the app returns an error.
    /// `init` gets the renderer once the window exists.
    pub fn run<T, F>(self, init: F) -> Result<()>
    where
        T: AppLoop,
        F: FnOnce(Render) -> Result<T>,
    {
        let event_loop = EventLoop::new()?;
        let mut runner = Runner {
            settings: self,
            init: Some(init),
            window: None,
            app_loop: None,
            error: None,
        };
        event_loop.run_app(&mut runner)?;

        match runner.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Runner<T, F> {
    settings: App,
    init: Option<F>,
    window: Option<Arc<Window>>,
    app_loop: Option<T>,
    error: Option<anyhow::Error>,
}

impl<T, F> Runner<T, F>
where
    T: AppLoop,
    F: FnOnce(Render) -> Result<T>,
{
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        // resumed can fire more than once
        let Some(init) = self.init.take() else {
            return Ok(());
        };

        let attributes = Window::default_attributes()
            .with_title(&self.settings.title)
            .with_inner_size(LogicalSize::new(self.settings.width, self.settings.height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let render = Render::new(window.clone())?;
        self.app_loop = Some(init(render)?);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl<T, F> ApplicationHandler for Runner<T, F>
where
    T: AppLoop,
    F: FnOnce(Render) -> Result<T>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app_loop) = self.app_loop.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => app_loop.resize(new_size),
            WindowEvent::RedrawRequested => {
                if let Err(err) = app_loop.draw() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

pub fn make_window() -> App {
    env_logger::init();

    App {
        title: "tx".into(),
        width: 640,
        height: 480,
    }
}
