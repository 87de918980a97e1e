//! Simulated oven
//!
//! First-order thermal model for running profiles without hardware. The
//! heating rate follows the commanded intensity with a lag, and the oven
//! loses heat toward ambient in proportion to the temperature difference.

use reflow_core::control::Intensity;
use reflow_core::traits::{DeviceLink, LinkError, Reading};
use reflow_hal::Clock;

/// Port name that selects the simulated oven
pub const SIMULATED_PORT: &str = "fake";

/// Integration step (ms)
const STEP_MS: u64 = 100;

/// Thermal model parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimulationConfig {
    /// Room temperature (°C)
    pub ambient_c: f32,
    /// Heating rate at full intensity with no losses (°C/s)
    pub max_heating_rate: f32,
    /// Fraction of the gap to the commanded heating rate closed per second
    pub lag: f32,
    /// Heat loss per second per °C above ambient
    pub loss_coefficient: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ambient_c: 20.0,
            max_heating_rate: 3.0,
            lag: 0.3,
            loss_coefficient: 0.005,
        }
    }
}

/// Oven that exists only in memory
pub struct SimulatedOven<C: Clock> {
    clock: C,
    config: SimulationConfig,
    connected: bool,
    temperature_c: f32,
    heating_rate: f32,
    intensity: Intensity,
    last_update_ms: u64,
}

impl<C: Clock> SimulatedOven<C> {
    /// Create a cold, disconnected oven
    pub fn new(clock: C, config: SimulationConfig) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            config,
            connected: false,
            temperature_c: config.ambient_c,
            heating_rate: 0.0,
            intensity: Intensity::OFF,
            last_update_ms: now,
        }
    }

    /// Current model temperature (°C)
    pub fn temperature(&self) -> f32 {
        self.temperature_c
    }

    /// Intensity last commanded
    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    /// Integrate the model up to the clock's current time
    fn advance(&mut self) {
        let now = self.clock.now_ms();
        while self.last_update_ms < now {
            let step_ms = (now - self.last_update_ms).min(STEP_MS);
            let dt = step_ms as f32 / 1000.0;

            let commanded_rate = self.config.max_heating_rate * self.intensity.percent() / 100.0;
            self.heating_rate += (commanded_rate - self.heating_rate) * self.config.lag * dt;

            let loss = self.config.loss_coefficient * (self.temperature_c - self.config.ambient_c);
            self.temperature_c += (self.heating_rate - loss) * dt;
            if self.temperature_c < self.config.ambient_c {
                self.temperature_c = self.config.ambient_c;
            }

            self.last_update_ms += step_ms;
        }
    }
}

impl<C: Clock> DeviceLink for SimulatedOven<C> {
    fn connect(&mut self, _port: &str) -> Result<(), LinkError> {
        self.advance();
        self.connected = true;
        Ok(())
    }

    fn send_command(&mut self, intensity: Intensity) -> Result<(), LinkError> {
        if !self.connected {
            return Err(LinkError::Unavailable);
        }
        self.advance();
        self.intensity = intensity;
        Ok(())
    }

    fn read_temperature(&mut self) -> Result<Reading, LinkError> {
        if !self.connected {
            return Err(LinkError::Unavailable);
        }
        self.advance();
        Ok(Reading {
            temperature_c: self.temperature_c,
            sampled_at_ms: self.last_update_ms,
        })
    }

    fn disconnect(&mut self) {
        self.advance();
        self.intensity = Intensity::OFF;
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflow_hal::ManualClock;

    fn run_for(oven: &mut SimulatedOven<&ManualClock>, clock: &ManualClock, seconds: u64) {
        for _ in 0..seconds {
            clock.advance(1000);
            oven.read_temperature().unwrap();
        }
    }

    #[test]
    fn test_starts_at_ambient() {
        let clock = ManualClock::new(0);
        let mut oven = SimulatedOven::new(&clock, SimulationConfig::default());
        oven.connect(SIMULATED_PORT).unwrap();
        let reading = oven.read_temperature().unwrap();
        assert_eq!(reading.temperature_c, 20.0);
    }

    #[test]
    fn test_heats_at_full_intensity() {
        let clock = ManualClock::new(0);
        let mut oven = SimulatedOven::new(&clock, SimulationConfig::default());
        oven.connect(SIMULATED_PORT).unwrap();
        oven.send_command(Intensity::FULL).unwrap();

        run_for(&mut oven, &clock, 60);
        let hot = oven.temperature();
        assert!(hot > 100.0, "only reached {}", hot);
        // Never faster than the element allows
        assert!(hot < 20.0 + 3.0 * 60.0);
    }

    #[test]
    fn test_cools_toward_ambient_when_off() {
        let clock = ManualClock::new(0);
        let mut oven = SimulatedOven::new(&clock, SimulationConfig::default());
        oven.connect(SIMULATED_PORT).unwrap();
        oven.send_command(Intensity::FULL).unwrap();
        run_for(&mut oven, &clock, 60);
        let peak = oven.temperature();

        oven.send_command(Intensity::OFF).unwrap();
        run_for(&mut oven, &clock, 600);
        let cooled = oven.temperature();
        assert!(cooled < peak);
        assert!(cooled >= 20.0);
    }

    #[test]
    fn test_reading_stamped_with_clock() {
        let clock = ManualClock::new(1234);
        let mut oven = SimulatedOven::new(&clock, SimulationConfig::default());
        oven.connect(SIMULATED_PORT).unwrap();
        clock.advance(500);
        assert_eq!(oven.read_temperature().unwrap().sampled_at_ms, 1734);
    }

    #[test]
    fn test_requires_connection() {
        let clock = ManualClock::new(0);
        let mut oven = SimulatedOven::new(&clock, SimulationConfig::default());
        assert_eq!(oven.read_temperature(), Err(LinkError::Unavailable));
        assert_eq!(
            oven.send_command(Intensity::FULL),
            Err(LinkError::Unavailable)
        );
    }
}
