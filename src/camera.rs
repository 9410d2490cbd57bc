use nalgebra::{Matrix4, Orthographic3, Point3};

use crate::plain::Plain;

// maps gl's [-1, 1] depth range onto wgpu's [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectionType {
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    projection_type: ProjectionType,
}

impl Camera {
    pub fn new(projection_type: ProjectionType) -> Self {
        Self { projection_type }
    }

    /// Top-left origin, y down, one unit per pixel.
    ///
    /// [Camera::projection] panics unless both sides are non-zero.
    pub fn screen(width: u32, height: u32) -> Self {
        Self::new(ProjectionType::Orthographic {
            left: 0.0,
            right: width as f32,
            bottom: height as f32,
            top: 0.0,
            near: 0.0,
            far: 1.0,
        })
    }

    pub fn projection(&self) -> Matrix4<f32> {
        match self.projection_type {
            ProjectionType::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => {
                OPENGL_TO_WGPU_MATRIX
                    * Orthographic3::new(left, right, bottom, top, near, far).into_inner()
            }
        }
    }

    pub fn project(&self, point: Point3<f32>) -> Point3<f32> {
        self.projection().transform_point(&point)
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            projection: self.projection().into(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
}

unsafe impl Plain for CameraUniform {}
