use crate::error::PhysicsError;

/// Packed 8-bit RGB image, row-major, `width * height * 3` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            data: vec![0u8; width * height * 3],
        }
    }

    pub fn from_rgb(width: usize, height: usize, data: Vec<u8>) -> Result<Self, PhysicsError> {
        let expected = width.saturating_mul(height).saturating_mul(3);
        if width == 0 || height == 0 || data.len() != expected {
            return Err(PhysicsError::FrameSize {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut frame = Self::new(width, height);
        for px in frame.data.chunks_exact_mut(3) {
            px.copy_from_slice(&rgb);
        }
        frame
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    pub fn mean_abs_diff(&self, other: &Frame) -> f32 {
        if self.width != other.width || self.height != other.height {
            return f32::INFINITY;
        }
        let total: u64 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a.abs_diff(*b) as u64)
            .sum();
        total as f32 / self.data.len().max(1) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    #[default]
    Clamp,
    Black,
    Wrap,
    Mirror,
}

impl Boundary {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" | "edge" => Some(Self::Clamp),
            "black" | "zero" | "constant" => Some(Self::Black),
            "wrap" | "tile" | "repeat" => Some(Self::Wrap),
            "mirror" | "reflect" => Some(Self::Mirror),
            _ => None,
        }
    }

    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            log::warn!("unrecognized boundary policy '{s}', falling back to clamp");
            Self::Clamp
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clamp => "clamp",
            Self::Black => "black",
            Self::Wrap => "wrap",
            Self::Mirror => "mirror",
        }
    }
}
