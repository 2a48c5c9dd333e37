use crate::numerics::{Bracket, bracket, log_log_between};

/// Tabulated total mass attenuation curve for one element.
///
/// The energy grid is non-decreasing; a value repeated once marks an
/// absorption edge, with the below-edge sample first.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementCrossSection {
    atomic_number: u32,
    energies_kev: Vec<f64>,
    mass_attenuation: Vec<f64>,
    ln_energies: Vec<f64>,
    ln_mass_attenuation: Vec<f64>,
}

impl ElementCrossSection {
    pub(super) fn new(
        atomic_number: u32,
        energies_kev: Vec<f64>,
        mass_attenuation: Vec<f64>,
    ) -> Self {
        let ln_energies = energies_kev.iter().map(|energy| energy.ln()).collect();
        let ln_mass_attenuation = mass_attenuation.iter().map(|value| value.ln()).collect();
        Self {
            atomic_number,
            energies_kev,
            mass_attenuation,
            ln_energies,
            ln_mass_attenuation,
        }
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    pub fn energies_kev(&self) -> &[f64] {
        &self.energies_kev
    }

    /// Total mass attenuation coefficients in cm²/g, parallel to `energies_kev`.
    pub fn mass_attenuation(&self) -> &[f64] {
        &self.mass_attenuation
    }

    pub fn energy_range(&self) -> (f64, f64) {
        (
            self.energies_kev[0],
            self.energies_kev[self.energies_kev.len() - 1],
        )
    }

    /// Log-log interpolated coefficient, or `None` outside the tabulated range.
    pub fn evaluate(&self, energy_kev: f64) -> Option<f64> {
        match bracket(&self.energies_kev, energy_kev) {
            Bracket::Exact(index) => Some(self.mass_attenuation[index]),
            Bracket::Between(lower, upper) => Some(log_log_between(
                energy_kev.ln(),
                self.ln_energies[lower],
                self.ln_mass_attenuation[lower],
                self.ln_energies[upper],
                self.ln_mass_attenuation[upper],
            )),
            Bracket::Below | Bracket::Above => None,
        }
    }

    pub(super) fn first_value(&self) -> f64 {
        self.mass_attenuation[0]
    }

    pub(super) fn last_value(&self) -> f64 {
        self.mass_attenuation[self.mass_attenuation.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::ElementCrossSection;
    use crate::numerics::within_tolerance;

    fn power_law_curve() -> ElementCrossSection {
        // mac = 1000 * E^-3 on [10, 40] keV.
        let energies = vec![10.0, 20.0, 40.0];
        let values = energies.iter().map(|e: &f64| 1000.0 * e.powi(-3)).collect();
        ElementCrossSection::new(8, energies, values)
    }

    #[test]
    fn knots_return_tabulated_values_exactly() {
        let curve = power_law_curve();
        for (energy, value) in curve.energies_kev().iter().zip(curve.mass_attenuation()) {
            assert_eq!(curve.evaluate(*energy), Some(*value));
        }
    }

    #[test]
    fn interior_points_follow_log_log_interpolation() {
        let curve = power_law_curve();
        let value = curve.evaluate(30.0).expect("in range");
        assert!(within_tolerance(value, 1000.0 / 27_000.0, 1.0e-15, 1.0e-12));
    }

    #[test]
    fn out_of_range_energies_are_not_evaluated() {
        let curve = power_law_curve();
        assert_eq!(curve.evaluate(9.999), None);
        assert_eq!(curve.evaluate(40.001), None);
        assert_eq!(curve.evaluate(f64::NAN), None);
        assert_eq!(curve.energy_range(), (10.0, 40.0));
    }

    #[test]
    fn edge_energy_uses_the_above_edge_value() {
        let curve = ElementCrossSection::new(
            13,
            vec![1.0, 1.5596, 1.5596, 2.0],
            vec![1185.0, 367.0, 3957.0, 2263.0],
        );
        assert_eq!(curve.evaluate(1.5596), Some(3957.0));

        let below = curve.evaluate(1.55).expect("below edge");
        let above = curve.evaluate(1.57).expect("above edge");
        assert!(below < 400.0);
        assert!(above > 3000.0);
    }
}
