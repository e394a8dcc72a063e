use log::info;

/// Receives coarse progress of long running work, like building the index.
pub trait ProgressListener {
	/// Starts a new piece of work with `total` steps.
	fn init(&mut self, total: usize, title: &str);

	/// Reports that step `n` (counted from one) has started.
	fn step(&mut self, n: usize, message: &str);
}

impl<T: ProgressListener + ?Sized> ProgressListener for &mut T {
	fn init(&mut self, total: usize, title: &str) {
		(**self).init(total, title)
	}

	fn step(&mut self, n: usize, message: &str) {
		(**self).step(n, message)
	}
}

#[derive(Debug, Copy, Clone, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {
	fn init(&mut self, _total: usize, _title: &str) {}
	fn step(&mut self, _n: usize, _message: &str) {}
}

/// Reports progress as `info` log messages.
#[derive(Debug, Clone, Default)]
pub struct LoggingProgress {
	title: String,
	total: usize,
}

impl LoggingProgress {
	pub fn new() -> LoggingProgress {
		LoggingProgress::default()
	}
}

impl ProgressListener for LoggingProgress {
	fn init(&mut self, total: usize, title: &str) {
		self.title = title.to_owned();
		self.total = total;
		info!("{title}");
	}

	fn step(&mut self, n: usize, message: &str) {
		info!("{}: [{n}/{}] {message}", self.title, self.total);
	}
}
