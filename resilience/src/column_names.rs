//! This module stores the column names of the unified table and of every normalized source.
//! Downstream analysis reads the unified table by these names, so they must stay stable.

pub const ISO3: &str = "iso3";
pub const YEAR: &str = "year";
pub const REGION: &str = "region";
pub const INCOME_GROUP: &str = "income_group";

pub const DII: &str = "DII";
pub const DII_NORMALIZED: &str = "DII_normalized";
pub const RRS: &str = "RRS";
pub const RRS_NORMALIZED: &str = "RRS_normalized";
pub const CRI: &str = "CRI";
pub const CRI_NORMALIZED: &str = "CRI_normalized";

// Consolidated fields
pub const TOTAL_DISASTER_DEATHS: &str = "total_disaster_deaths";
pub const TOTAL_DISASTER_AFFECTED: &str = "total_disaster_affected";
pub const TOTAL_DISASTER_EVENTS: &str = "total_disaster_events";
pub const GDP_PER_CAPITA_BEST: &str = "gdp_per_capita_best";
pub const GDP_GROWTH_BEST: &str = "gdp_growth_best";
pub const GINI_BEST: &str = "gini_best";
pub const EDUCATION_YEARS_BEST: &str = "education_years_best";

// Index intermediates
pub const FATALITIES_PER_MILLION: &str = "fatalities_per_million";
pub const AFFECTED_PCT: &str = "affected_pct";
pub const GDP_GROWTH_CHANGE: &str = "gdp_growth_change";
pub const DISASTER_EVENTS_TRAILING: &str = "disaster_events_trailing";

// ND-GAIN (spine)
pub const NDGAIN_SCORE: &str = "ndgain_score";
pub const NDGAIN_READINESS: &str = "ndgain_readiness";
pub const NDGAIN_VULNERABILITY: &str = "ndgain_vulnerability";
pub const NDGAIN_FOOD: &str = "ndgain_food";
pub const NDGAIN_WATER: &str = "ndgain_water";
pub const NDGAIN_HEALTH: &str = "ndgain_health";
pub const NDGAIN_INFRASTRUCTURE: &str = "ndgain_infrastructure";

// Nighttime lights
pub const NTL_RADIANCE: &str = "ntl_radiance";
pub const NTL_GROWTH: &str = "ntl_growth";

// EM-DAT
pub const EMDAT_DEATHS: &str = "emdat_deaths";
pub const EMDAT_AFFECTED: &str = "emdat_affected";
pub const EMDAT_DAMAGE_USD: &str = "emdat_damage_usd";
pub const EMDAT_EVENT_COUNT: &str = "emdat_event_count";

// GDACS
pub const GDACS_DISASTER_COUNT: &str = "gdacs_disaster_count";
pub const GDACS_RED_ALERTS: &str = "gdacs_red_alerts";
pub const GDACS_ORANGE_ALERTS: &str = "gdacs_orange_alerts";
pub const GDACS_AVG_ALERT_SCORE: &str = "gdacs_avg_alert_score";
pub const GDACS_SEVERITY_WEIGHT: &str = "gdacs_severity_weight";

// IMF WEO
pub const GDP_GROWTH_IMF: &str = "gdp_growth_imf";
pub const GDP_PER_CAPITA_IMF: &str = "gdp_per_capita_imf";
pub const INFLATION_RATE: &str = "inflation_rate";
pub const UNEMPLOYMENT_RATE: &str = "unemployment_rate";
pub const POPULATION_IMF: &str = "population_imf";
pub const GOVT_REVENUE_PCT_GDP: &str = "govt_revenue_pct_gdp";
pub const GOVT_DEBT_PCT_GDP: &str = "govt_debt_pct_gdp";

// World Bank WDI
pub const GDP_GROWTH: &str = "gdp_growth";
pub const GDP_PER_CAPITA: &str = "gdp_per_capita";
pub const GDP_PER_CAPITA_PPP: &str = "gdp_per_capita_ppp";
pub const GINI_INDEX: &str = "gini_index";
pub const POVERTY_RATE: &str = "poverty_rate";
pub const HOSPITAL_BEDS_PER_1K: &str = "hospital_beds_per_1k";
pub const PHYSICIANS_PER_1K: &str = "physicians_per_1k";
pub const INTERNET_USERS_PCT: &str = "internet_users_pct";
pub const LITERACY_RATE: &str = "literacy_rate";
pub const SECONDARY_ENROLLMENT: &str = "secondary_enrollment";
pub const POPULATION: &str = "population";
pub const URBAN_POPULATION_PCT: &str = "urban_population_pct";
pub const HEALTH_EXPENDITURE_PCT_GDP: &str = "health_expenditure_pct_gdp";
pub const ELECTRICITY_ACCESS_PCT: &str = "electricity_access_pct";
pub const SANITATION_ACCESS_PCT: &str = "sanitation_access_pct";
pub const WATER_ACCESS_PCT: &str = "water_access_pct";
pub const FOREST_AREA_PCT: &str = "forest_area_pct";
pub const CO2_EMISSIONS_PER_CAPITA: &str = "co2_emissions_per_capita";
pub const EASE_DOING_BUSINESS: &str = "ease_doing_business";
pub const INFLATION_WDI: &str = "inflation_wdi";

// HDR
pub const HDI: &str = "hdi";
pub const LIFE_EXPECTANCY: &str = "life_expectancy";
pub const EXPECTED_YEARS_SCHOOLING: &str = "expected_years_schooling";
pub const MEAN_YEARS_SCHOOLING: &str = "mean_years_schooling";
pub const GNI_PER_CAPITA: &str = "gni_per_capita";

// WGI
pub const WGI_VOICE_ACCOUNTABILITY: &str = "wgi_voice_accountability";
pub const WGI_POLITICAL_STABILITY: &str = "wgi_political_stability";
pub const WGI_GOV_EFFECTIVENESS: &str = "wgi_gov_effectiveness";
pub const WGI_REGULATORY_QUALITY: &str = "wgi_regulatory_quality";
pub const WGI_RULE_OF_LAW: &str = "wgi_rule_of_law";
pub const WGI_CONTROL_CORRUPTION: &str = "wgi_control_corruption";
pub const WGI_COMPOSITE: &str = "wgi_composite";

// INFORM
pub const INFORM_RISK: &str = "inform_risk";
pub const INFORM_HAZARD: &str = "inform_hazard";
pub const INFORM_VULNERABILITY: &str = "inform_vulnerability";
pub const INFORM_COPING_CAPACITY: &str = "inform_coping_capacity";
pub const INFORM_NATURAL_HAZARD: &str = "inform_natural_hazard";
pub const INFORM_HUMAN_HAZARD: &str = "inform_human_hazard";
pub const INFORM_SOCIOECONOMIC_VULNERABILITY: &str = "inform_socioeconomic_vulnerability";
pub const INFORM_VULNERABLE_GROUPS: &str = "inform_vulnerable_groups";
pub const INFORM_INSTITUTIONAL: &str = "inform_institutional";
pub const INFORM_INFRASTRUCTURE: &str = "inform_infrastructure";

// FTS
pub const HUMANITARIAN_FUNDING_USD: &str = "humanitarian_funding_usd";

// DesInventar
pub const DESINVENTAR_EVENTS: &str = "desinventar_events";
pub const DESINVENTAR_DEATHS: &str = "desinventar_deaths";
pub const DESINVENTAR_AFFECTED: &str = "desinventar_affected";
pub const DESINVENTAR_HOUSES_DESTROYED: &str = "desinventar_houses_destroyed";
pub const DESINVENTAR_HOUSES_DAMAGED: &str = "desinventar_houses_damaged";

// Barro-Lee
pub const YEARS_OF_SCHOOLING: &str = "years_of_schooling";
pub const YEARS_PRIMARY_SCHOOLING: &str = "years_primary_schooling";
pub const YEARS_SECONDARY_SCHOOLING: &str = "years_secondary_schooling";
pub const YEARS_TERTIARY_SCHOOLING: &str = "years_tertiary_schooling";
pub const NO_SCHOOLING_PCT: &str = "no_schooling_pct";
pub const PRIMARY_COMPLETED_PCT: &str = "primary_completed_pct";
pub const SECONDARY_COMPLETED_PCT: &str = "secondary_completed_pct";
pub const TERTIARY_COMPLETED_PCT: &str = "tertiary_completed_pct";

// Gini (WID)
pub const GINI_WID: &str = "gini_wid";

// Coverage matrix
pub const COVERAGE_VARIABLE: &str = "variable";
pub const COVERAGE_TOTAL_OBS: &str = "total_obs";
pub const COVERAGE_NON_NULL_OBS: &str = "non_null_obs";
pub const COVERAGE_PCT: &str = "coverage_pct";
pub const COVERAGE_COUNTRIES: &str = "countries_covered";
pub const COVERAGE_YEAR_MIN: &str = "year_min";
pub const COVERAGE_YEAR_MAX: &str = "year_max";

/// Identifier columns, in output order.
pub const KEY_COLUMNS: [&str; 4] = [ISO3, YEAR, REGION, INCOME_GROUP];

/// Derived index columns, in output order.
pub const INDEX_COLUMNS: [&str; 6] = [DII, DII_NORMALIZED, RRS, RRS_NORMALIZED, CRI, CRI_NORMALIZED];

pub const CONSOLIDATED_COLUMNS: [&str; 7] = [
    TOTAL_DISASTER_DEATHS,
    TOTAL_DISASTER_AFFECTED,
    TOTAL_DISASTER_EVENTS,
    GDP_PER_CAPITA_BEST,
    GDP_GROWTH_BEST,
    GINI_BEST,
    EDUCATION_YEARS_BEST,
];

pub const INTERMEDIATE_COLUMNS: [&str; 4] = [
    FATALITIES_PER_MILLION,
    AFFECTED_PCT,
    GDP_GROWTH_CHANGE,
    DISASTER_EVENTS_TRAILING,
];
