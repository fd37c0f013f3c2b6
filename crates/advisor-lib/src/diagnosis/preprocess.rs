//! Image preprocessing for the leaf classifier
//!
//! Upload bytes become the classifier's input tensor: RGB,
//! 224x224, intensities scaled to [0,1], leading batch dimension.

use tract_onnx::prelude::*;

use crate::error::DiagnoseError;

/// Spatial resolution the classifier was trained on
pub const INPUT_WIDTH: u32 = 224;
pub const INPUT_HEIGHT: u32 = 224;

pub fn preprocess(image_bytes: &[u8]) -> Result<Tensor, DiagnoseError> {
    if image_bytes.is_empty() {
        return Err(DiagnoseError::EmptyImage);
    }

    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| DiagnoseError::ImageDecode(e.to_string()))?;
    let resized = decoded.resize_exact(
        INPUT_WIDTH,
        INPUT_HEIGHT,
        image::imageops::FilterType::Triangle,
    );
    let rgb = resized.to_rgb8();

    // Row-major pixel iteration flattens straight into NHWC
    let mut data = Vec::with_capacity((INPUT_WIDTH * INPUT_HEIGHT * 3) as usize);
    for pixel in rgb.pixels() {
        data.push(f32::from(pixel[0]) / 255.0);
        data.push(f32::from(pixel[1]) / 255.0);
        data.push(f32::from(pixel[2]) / 255.0);
    }

    let array = tract_ndarray::Array4::from_shape_vec(
        (1, INPUT_HEIGHT as usize, INPUT_WIDTH as usize, 3),
        data,
    )
    .map_err(|e| DiagnoseError::ImageDecode(e.to_string()))?;

    Ok(array.into())
}
