use crate::{AreaError, SearchArea};

/// Boundary of the monitored area, covering the central and eastern Tokyo wards.
///
/// Drawn with https://www.daftlogic.com/projects-google-maps-area-calculator-tool.htm
pub const TOKYO_SEARCH_AREA: &str = "
  35.6153070338361,139.80924926220052
  35.6153070338361,139.75122771679037
  35.62005163712189,139.70762572704427
  35.627865664220096,139.6811898749935
  35.64377043107985,139.65750060497396
  35.65537538785369,139.65003266452425
  35.66932230505118,139.6447111618387
  35.679502016200914,139.64196457980745
  35.700833362307215,139.64024796603792
  35.7149117129844,139.64282288669222
  35.72926628188838,139.65537588820064
  35.733168047672926,139.68061011061275
  35.73344673791457,139.7573427461108
  35.738881002690384,139.78858511671626
  35.73720896072076,139.8067812226733
  35.73372542718092,139.84162848219478
  35.71638438976669,139.8676982787228
  35.68515833631982,139.88297614127163
  35.6664117180705,139.90014227896694
  35.64674514383532,139.91768727478453
  35.621213220421126,139.90635762390562
  35.61702908580878,139.85866927979654
  35.61395896450415,139.8411598193473
";

impl SearchArea {
    /// The built-in Tokyo area of interest.
    pub fn tokyo() -> Result<Self, AreaError> {
        Self::parse(TOKYO_SEARCH_AREA)
    }
}
