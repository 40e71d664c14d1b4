use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

use super::embedding::{Embedding, EMBEDDING_DIM};

/// A single live-captured video frame, RGB8 row-major. A frame cannot be
/// constructed with an empty or mis-sized buffer, so the encoder never has
/// to re-validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidFrame(format!(
                "zero-sized frame ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(Error::InvalidFrame(format!(
                "{width}x{height} RGB frame needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixel bytes of a face region, rows concatenated. The box is
    /// clamped to the frame bounds.
    fn region(&self, face: &FaceBox) -> Vec<u8> {
        let right = face.right.min(self.width) as usize;
        let bottom = face.bottom.min(self.height) as usize;
        let left = (face.left as usize).min(right);
        let top = (face.top as usize).min(bottom);

        let mut pixels = Vec::with_capacity((bottom - top) * (right - left) * 3);
        for row in top..bottom {
            let start = (row * self.width as usize + left) * 3;
            let end = (row * self.width as usize + right) * 3;
            pixels.extend_from_slice(&self.pixels[start..end]);
        }
        pixels
    }
}

/// Axis-aligned bounding box of one detected face, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBox {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

/// Face detection strategy. The live camera pipeline brings its own
/// detector; this crate only fixes the policy applied to its output
/// (exactly one face per frame).
pub trait FaceDetector {
    fn detect(&self, frame: &Frame) -> Vec<FaceBox>;
}

/// Treats every frame as containing exactly one face filling the whole
/// frame. Useful when detection and cropping already happened upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeFrameDetector;

impl FaceDetector for WholeFrameDetector {
    fn detect(&self, frame: &Frame) -> Vec<FaceBox> {
        vec![FaceBox {
            top: 0,
            left: 0,
            bottom: frame.height(),
            right: frame.width(),
        }]
    }
}

/// Derives embeddings from captured frames: detect, enforce the
/// single-face policy, then extract features from the face region.
#[derive(Debug, Clone, Default)]
pub struct FaceEncoder<D> {
    detector: D,
}

impl<D: FaceDetector> FaceEncoder<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    /// Extract the embedding of the single face in `frame`. Fails with
    /// [`Error::NoFaceDetected`] unless the detector finds exactly one
    /// face. Deterministic: the same frame always encodes to the same
    /// embedding.
    pub fn encode(&self, frame: &Frame) -> Result<Embedding> {
        let faces = self.detector.detect(frame);
        if faces.len() != 1 {
            return Err(Error::NoFaceDetected(faces.len()));
        }
        Ok(embed(&frame.region(&faces[0])))
    }
}

/// Expand the face pixels into a unit-norm 128-component vector via
/// counter-mode hashing: each digest block yields eight components mapped
/// to [-1, 1], then the whole vector is L2-normalised.
fn embed(pixels: &[u8]) -> Embedding {
    let seed: [u8; 32] = Sha256::digest(pixels).into();
    let mut components = [0.0f32; EMBEDDING_DIM];
    let mut i = 0;
    let mut block: u32 = 0;
    while i < EMBEDDING_DIM {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(block.to_le_bytes());
        let digest = hasher.finalize();
        for word in digest.chunks_exact(4) {
            if i == EMBEDDING_DIM {
                break;
            }
            let raw = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            components[i] = (raw as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32;
            i += 1;
        }
        block += 1;
    }

    let norm = components.iter().map(|c| (c * c) as f64).sum::<f64>().sqrt() as f32;
    for c in &mut components {
        *c /= norm + 1e-8;
    }
    Embedding::from_components(components)
}


#[cfg(test)]
mod tests {
    use crate::pipeline::Commitment;

    use super::*;

    /// A detector reporting a fixed number of whole-frame faces.
    struct FixedCountDetector(usize);

    impl FaceDetector for FixedCountDetector {
        fn detect(&self, frame: &Frame) -> Vec<FaceBox> {
            vec![
                FaceBox {
                    top: 0,
                    left: 0,
                    bottom: frame.height(),
                    right: frame.width(),
                };
                self.0
            ]
        }
    }

    #[test]
    fn mis_sized_frames_are_rejected() {
        assert!(matches!(
            Frame::new(0, 16, vec![]),
            Err(Error::InvalidFrame(_))
        ));
        assert!(matches!(
            Frame::new(16, 16, vec![0; 17]),
            Err(Error::InvalidFrame(_))
        ));
    }

    #[test]
    fn encoding_is_deterministic() {
        let encoder = FaceEncoder::new(WholeFrameDetector);
        let frame = Frame::example(3);
        let a = encoder.encode(&frame).unwrap();
        let b = encoder.encode(&frame).unwrap();
        assert_eq!(a, b);
        assert_eq!(Commitment::of(&a), Commitment::of(&b));
    }

    #[test]
    fn distinct_frames_encode_differently() {
        let encoder = FaceEncoder::new(WholeFrameDetector);
        let a = encoder.encode(&Frame::example(3)).unwrap();
        let b = encoder.encode(&Frame::example(4)).unwrap();
        assert_ne!(a, b);
        assert!(a.distance(&b) > 0.0);
    }

    #[test]
    fn embeddings_are_unit_norm() {
        let encoder = FaceEncoder::new(WholeFrameDetector);
        let embedding = encoder.encode(&Frame::example(7)).unwrap();
        let norm: f32 = embedding.components().iter().map(|c| c * c).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[test]
    fn zero_or_many_faces_are_rejected() {
        let frame = Frame::example(1);
        assert_eq!(
            FaceEncoder::new(FixedCountDetector(0)).encode(&frame),
            Err(Error::NoFaceDetected(0))
        );
        assert_eq!(
            FaceEncoder::new(FixedCountDetector(2)).encode(&frame),
            Err(Error::NoFaceDetected(2))
        );
    }
}
