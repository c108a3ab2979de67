//! Parameter names shared between models and input files.
//!
//! A name declared by more than one model is one user input: applying it
//! sets every model that declares it, and piping uses the same names to
//! move outputs downstream.

#![allow(missing_docs)]

// Shared inputs.
pub const PLANT_LIFETIME: &str = "Plant Lifetime";
pub const TIME_STEPS_PER_YEAR: &str = "Time steps per year";
pub const INJECTION_TEMPERATURE: &str = "Injection Temperature";

// Reservoir.
pub const RESERVOIR_MODEL: &str = "Reservoir Model";
pub const RESERVOIR_DEPTH: &str = "Reservoir Depth";
pub const GRADIENT: &str = "Gradient 1";
pub const SURFACE_TEMPERATURE: &str = "Surface Temperature";
pub const DRAWDOWN_PARAMETER: &str = "Drawdown Parameter";
pub const ROCK_CONDUCTIVITY: &str = "Reservoir Thermal Conductivity";
pub const ROCK_DENSITY: &str = "Reservoir Density";
pub const ROCK_HEAT_CAPACITY: &str = "Reservoir Heat Capacity";
pub const BOTTOM_HOLE_TEMPERATURE: &str = "Bottom-hole Temperature";
pub const RESERVOIR_PRODUCED_TEMPERATURE: &str = "Reservoir Produced Temperature";

// Well bores.
pub const PRODUCTION_WELLS: &str = "Number of Production Wells";
pub const INJECTION_WELLS: &str = "Number of Injection Wells";
pub const FLOW_RATE_PER_WELL: &str = "Production Flow Rate per Well";
pub const RAMEY_MODEL: &str = "Ramey Production Wellbore Model";
pub const WELLBORE_TEMPERATURE_DROP: &str = "Production Wellbore Temperature Drop";
pub const RESERVOIR_IMPEDANCE: &str = "Reservoir Impedance";
pub const PUMP_EFFICIENCY: &str = "Pump Efficiency";
pub const PRODUCED_TEMPERATURE: &str = "Produced Temperature";
pub const TOTAL_FLOW_RATE: &str = "Total Production Flow Rate";
pub const PUMPING_POWER: &str = "Pumping Power";

// Surface plant.
pub const END_USE_OPTION: &str = "End-Use Option";
pub const POWER_PLANT_TYPE: &str = "Power Plant Type";
pub const AMBIENT_TEMPERATURE: &str = "Ambient Temperature";
pub const UTILIZATION_FACTOR: &str = "Utilization Factor";
pub const HEAT_EXTRACTED: &str = "Heat Extracted";
pub const FIRST_LAW_EFFICIENCY: &str = "First Law Efficiency";
pub const NET_ELECTRICITY: &str = "Net Electricity Produced";
pub const HEAT_PRODUCED: &str = "Heat Produced";
pub const ANNUAL_ELECTRICITY: &str = "Annual Net Electricity Production";
pub const ANNUAL_HEAT: &str = "Annual Heat Production";

// Economics.
pub const ECONOMIC_MODEL: &str = "Economic Model";
pub const FIXED_CHARGE_RATE: &str = "Fixed Charge Rate";
pub const DISCOUNT_RATE: &str = "Discount Rate";
pub const BOND_FRACTION: &str = "Fraction of Investment in Bonds";
pub const BOND_RATE: &str = "Inflated Bond Interest Rate";
pub const EQUITY_RATE: &str = "Inflated Equity Interest Rate";
pub const INFLATION_RATE: &str = "Inflation Rate";
pub const INCOME_TAX_RATE: &str = "Combined Income Tax Rate";
pub const CONSTRUCTION_INFLATION: &str = "Inflation Rate During Construction";
pub const CAPITAL_COST: &str = "Total Capital Cost";
pub const OM_COST: &str = "Total O&M Cost";
pub const ELECTRICITY_RATE: &str = "Electricity Rate";
pub const LCOE: &str = "LCOE";
pub const CAPITAL_RECOVERY_FACTOR: &str = "Capital Recovery Factor";
pub const PROJECT_NPV: &str = "Project NPV";
pub const PROJECT_IRR: &str = "Project IRR";
pub const PAYBACK_PERIOD: &str = "Project Payback Period";
