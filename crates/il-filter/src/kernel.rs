//! Convolution kernels with dual integer/float representations.

use il_core::{Error, Point, Size};

/// Weight matrix for [`crate::conv::convolve`].
///
/// A kernel always carries a float representation (pre-normalized: the
/// coefficients already include the scale). When the weights are known as
/// integers-over-a-divisor — either given that way or recovered from
/// losslessly-integral floats — the integer form is kept as well, so
/// narrow-pixel sources can run the faster integer accumulation. A kernel
/// holding only a non-integral float form forces the float path even for
/// `u8` sources.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: Size,
    anchor: Point,
    coeffs_f32: Vec<f32>,
    coeffs_i32: Option<Vec<i32>>,
    norm: i32,
}

impl Kernel {
    /// Kernel from integer weights and a normalization divisor; the float
    /// form is derived as `coeff / norm`.
    pub fn from_i32(
        size: Size,
        anchor: Point,
        coeffs: Vec<i32>,
        norm: i32,
    ) -> Result<Self, Error> {
        check_geometry(size, anchor, coeffs.len())?;
        if norm == 0 {
            return Err(Error::ZeroNormFactor);
        }

        let coeffs_f32 = coeffs.iter().map(|&c| c as f32 / norm as f32).collect();
        Ok(Self {
            size,
            anchor,
            coeffs_f32,
            coeffs_i32: Some(coeffs),
            norm,
        })
    }

    /// Kernel from float weights. Weights that are all integral are also
    /// kept as an integer form with norm 1.
    pub fn from_f32(size: Size, anchor: Point, coeffs: Vec<f32>) -> Result<Self, Error> {
        check_geometry(size, anchor, coeffs.len())?;

        let integral = coeffs
            .iter()
            .all(|&c| c.fract() == 0.0 && c.abs() <= i32::MAX as f32);
        let coeffs_i32 = integral.then(|| coeffs.iter().map(|&c| c as i32).collect());

        Ok(Self {
            size,
            anchor,
            coeffs_f32: coeffs,
            coeffs_i32,
            norm: 1,
        })
    }

    /// Centered kernel that leaves the input unchanged.
    pub fn identity(size: Size) -> Result<Self, Error> {
        let anchor = Point::new(size.width / 2, size.height / 2);
        let mut coeffs = vec![0i32; size.area()];
        coeffs[anchor.y * size.width + anchor.x] = 1;
        Self::from_i32(size, anchor, coeffs, 1)
    }

    /// Uniform averaging kernel.
    pub fn box_blur(size: Size) -> Result<Self, Error> {
        let anchor = Point::new(size.width / 2, size.height / 2);
        let n = size.area() as i32;
        Self::from_i32(size, anchor, vec![1; size.area()], n)
    }

    /// 3x3 binomial approximation of a Gaussian.
    pub fn gauss3() -> Self {
        Self::from_i32(
            Size::new(3, 3),
            Point::new(1, 1),
            vec![1, 2, 1, 2, 4, 2, 1, 2, 1],
            16,
        )
        .expect("static coefficients")
    }

    /// 3x3 horizontal Sobel derivative.
    pub fn sobel_x() -> Self {
        Self::from_i32(
            Size::new(3, 3),
            Point::new(1, 1),
            vec![-1, 0, 1, -2, 0, 2, -1, 0, 1],
            1,
        )
        .expect("static coefficients")
    }

    /// 3x3 vertical Sobel derivative.
    pub fn sobel_y() -> Self {
        Self::from_i32(
            Size::new(3, 3),
            Point::new(1, 1),
            vec![-1, -2, -1, 0, 0, 0, 1, 2, 1],
            1,
        )
        .expect("static coefficients")
    }

    /// 3x3 Laplacian.
    pub fn laplace() -> Self {
        Self::from_i32(
            Size::new(3, 3),
            Point::new(1, 1),
            vec![0, 1, 0, 1, -4, 1, 0, 1, 0],
            1,
        )
        .expect("static coefficients")
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn coeffs_f32(&self) -> &[f32] {
        &self.coeffs_f32
    }

    pub fn coeffs_i32(&self) -> Option<&[i32]> {
        self.coeffs_i32.as_deref()
    }

    pub fn norm(&self) -> i32 {
        self.norm
    }

    /// True when the integer fast path is available.
    pub fn has_int(&self) -> bool {
        self.coeffs_i32.is_some()
    }
}

fn check_geometry(size: Size, anchor: Point, len: usize) -> Result<(), Error> {
    if size.is_empty() || len != size.area() {
        return Err(Error::KernelSizeMismatch {
            expected: size.area(),
            actual: len,
        });
    }
    if anchor.x >= size.width || anchor.y >= size.height {
        return Err(Error::AnchorOutOfKernel { anchor, size });
    }
    Ok(())
}
