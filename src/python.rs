use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::particle::DIM;
use crate::core::{Color, ParticleSpec, RealTime, Simulation, Tick, Unpaced};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Python-facing wrapper around the Rust `Simulation`.
///
/// - __new__(width=400, height=400, fps=100, realtime=False)
/// - add_particle(x, y, vx, vy, mass, radius, r=0, g=0, b=0) -> index
/// - step() -> simulation time of the frame, or None while paused
/// - get_disks() -> np.ndarray of int64, shape (N, 6): x, y, radius, r, g, b
#[pyclass]
pub struct Collider {
    sim: Simulation,
}

#[pymethods]
impl Collider {
    /// Create an empty arena. With `realtime=True`, `step` sleeps to match wall-clock pacing.
    #[new]
    #[pyo3(signature = (width=400, height=400, fps=100, realtime=false))]
    fn new(width: u32, height: u32, fps: u32, realtime: bool) -> PyResult<Self> {
        let sim = Simulation::new(width, height, fps).map_err(py_err)?;
        let sim = if realtime {
            sim.with_pacer(RealTime)
        } else {
            sim.with_pacer(Unpaced)
        };
        Ok(Self { sim })
    }

    /// Add a particle in normalized coordinates. Raises ValueError on overlap.
    #[allow(clippy::too_many_arguments)]
    #[pyo3(signature = (x, y, vx, vy, mass, radius, r=0, g=0, b=0))]
    fn add_particle(
        &mut self,
        x: f64,
        y: f64,
        vx: f64,
        vy: f64,
        mass: u32,
        radius: f64,
        r: u8,
        g: u8,
        b: u8,
    ) -> PyResult<usize> {
        let spec = ParticleSpec {
            x,
            y,
            vx,
            vy,
            mass,
            radius,
            color: Color { r, g, b },
        };
        self.sim.add_particle(&spec).map_err(py_err)
    }

    /// Add `n` random non-overlapping particles.
    #[pyo3(signature = (n, seed=None))]
    fn add_random_particles(&mut self, n: usize, seed: Option<u64>) -> PyResult<()> {
        self.sim.add_random_particles(n, seed).map_err(py_err)
    }

    /// Advance to the next frame (releases the GIL during computation).
    fn step(&mut self, py: Python<'_>) -> PyResult<Option<f64>> {
        let tick = py.detach(|| self.sim.step()).map_err(py_err)?;
        Ok(match tick {
            Tick::Frame { time } => Some(time),
            Tick::Paused => None,
        })
    }

    fn pause(&mut self) {
        self.sim.pause();
    }

    fn resume(&mut self) {
        self.sim.resume();
    }

    fn inc_speed(&mut self) {
        self.sim.inc_speed();
    }

    fn dec_speed(&mut self) {
        self.sim.dec_speed();
    }

    #[getter]
    fn paused(&self) -> bool {
        self.sim.is_paused()
    }

    #[getter]
    fn speed(&self) -> u32 {
        self.sim.speed()
    }

    #[getter]
    fn time(&self) -> f64 {
        self.sim.time()
    }

    fn kinetic_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }

    /// Return disks as a NumPy array of shape (N, 6), dtype=int64.
    fn get_disks(&self, py: Python<'_>) -> PyResult<Py<PyArray2<i64>>> {
        let n = self.sim.num_particles();
        let mut arr = Array2::<i64>::zeros((n, 6));
        for (i, d) in self.sim.disks().enumerate() {
            arr[[i, 0]] = d.x;
            arr[[i, 1]] = d.y;
            arr[[i, 2]] = i64::from(d.radius);
            arr[[i, 3]] = i64::from(d.color.r);
            arr[[i, 4]] = i64::from(d.color.g);
            arr[[i, 5]] = i64::from(d.color.b);
        }
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions(&self, py: Python<'_>) -> PyResult<Py<PyArray2<f64>>> {
        Ok(to_array(&self.sim.positions()).into_pyarray(py).to_owned().into())
    }

    /// Return velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities(&self, py: Python<'_>) -> PyResult<Py<PyArray2<f64>>> {
        Ok(to_array(&self.sim.velocities()).into_pyarray(py).to_owned().into())
    }
}

fn to_array(rows: &[[f64; DIM]]) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((rows.len(), DIM));
    for (i, row) in rows.iter().enumerate() {
        for k in 0..DIM {
            arr[[i, k]] = row[k];
        }
    }
    arr
}

/// The collider Python module entry point.
#[pymodule]
fn collider(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Collider>()?;
    Ok(())
}
