use nalgebra::{Matrix2, Vector2};

/// Idealized cantilever wing spar with a rectangular box section.
///
/// The two caps carry all bending stiffness; the shear web only sets the
/// distance between them. Cap width and thickness are the free section
/// parameters the optimizer searches over.
#[derive(Clone, Debug)]
pub struct SparModel {
    /// Cantilever span in m.
    pub length: f64,
    /// Depth between the cap centroids in m.
    pub web_height: f64,
    /// Young's modulus of the cap material in Pa.
    pub elastic_modulus: f64,
    /// Cap material density in kg/m^3.
    pub density: f64,
    /// Static load at the tip in N.
    pub tip_load: f64,
}

impl Default for SparModel {
    /// Aluminum spar of a light 3 m half-wing under a 2.5 kN tip load.
    fn default() -> Self {
        Self {
            length: 3.0,
            web_height: 0.08,
            elastic_modulus: 70.0e9,
            density: 2700.0,
            tip_load: 2500.0,
        }
    }
}

impl SparModel {
    /// Second moment of area of the two caps about the neutral axis.
    pub fn bending_inertia(&self, cap_width: f64, cap_thickness: f64) -> f64 {
        2.0 * cap_width * cap_thickness * (self.web_height / 2.0).powi(2)
    }

    /// Total cap mass over the span in kg.
    pub fn mass(&self, cap_width: f64, cap_thickness: f64) -> f64 {
        2.0 * self.density * cap_width * cap_thickness * self.length
    }

    /// Tip deflection in m under the static tip load.
    ///
    /// Solves the 2-DOF cantilever beam element for tip translation and
    /// rotation; the translation equals the closed-form P L^3 / (3 E I).
    pub fn tip_deflection(&self, cap_width: f64, cap_thickness: f64) -> f64 {
        let ei = self.elastic_modulus * self.bending_inertia(cap_width, cap_thickness);
        let l = self.length;
        let stiffness = Matrix2::new(
            12.0 * ei / l.powi(3),
            -6.0 * ei / l.powi(2),
            -6.0 * ei / l.powi(2),
            4.0 * ei / l,
        );
        let load = Vector2::new(self.tip_load, 0.0);
        let displacement = stiffness
            .lu()
            .solve(&load)
            .expect("cantilever stiffness matrix is invertible");
        displacement[0]
    }

    /// Fitness vector for the optimizer: cap mass, then tip deflection.
    pub fn evaluate(&self, position: &[f64]) -> Vec<f64> {
        let cap_width = position[0];
        let cap_thickness = position[1];
        vec![
            self.mass(cap_width, cap_thickness),
            self.tip_deflection(cap_width, cap_thickness),
        ]
    }
}
