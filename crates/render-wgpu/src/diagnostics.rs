use std::panic::Location;

/// Validation error scope around a span of GPU work.
///
/// Errors raised inside the scope are logged with the location that opened
/// it and never abort the frame.
pub struct ErrorScope<'a> {
    device: &'a wgpu::Device,
    location: &'static Location<'static>,
}

impl<'a> ErrorScope<'a> {
    #[track_caller]
    pub fn push(device: &'a wgpu::Device) -> Self {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        Self {
            device,
            location: Location::caller(),
        }
    }

    /// Close the scope, returning whether an error was captured.
    pub fn finish(self) -> bool {
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(error) => {
                tracing::error!(location = %self.location, "wgpu validation error: {error}");
                true
            }
            None => false,
        }
    }
}

/// Log errors raised outside any scope instead of panicking.
pub fn install_uncaptured_error_handler(device: &wgpu::Device) {
    device.on_uncaptured_error(Box::new(|error| {
        tracing::error!("uncaptured wgpu error: {error}");
    }));
}
