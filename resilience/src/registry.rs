//! Frozen ISO 3166-1 alpha-3 registry with English short names.
//!
//! Names are stored upper-cased and without diacritics so that they can be compared
//! directly against folded input.

pub const REGISTRY: &[(&str, &str)] = &[
    ("AFG", "AFGHANISTAN"),
    ("ALA", "ALAND ISLANDS"),
    ("ALB", "ALBANIA"),
    ("DZA", "ALGERIA"),
    ("ASM", "AMERICAN SAMOA"),
    ("AND", "ANDORRA"),
    ("AGO", "ANGOLA"),
    ("AIA", "ANGUILLA"),
    ("ATA", "ANTARCTICA"),
    ("ATG", "ANTIGUA AND BARBUDA"),
    ("ARG", "ARGENTINA"),
    ("ARM", "ARMENIA"),
    ("ABW", "ARUBA"),
    ("AUS", "AUSTRALIA"),
    ("AUT", "AUSTRIA"),
    ("AZE", "AZERBAIJAN"),
    ("BHS", "BAHAMAS"),
    ("BHR", "BAHRAIN"),
    ("BGD", "BANGLADESH"),
    ("BRB", "BARBADOS"),
    ("BLR", "BELARUS"),
    ("BEL", "BELGIUM"),
    ("BLZ", "BELIZE"),
    ("BEN", "BENIN"),
    ("BMU", "BERMUDA"),
    ("BTN", "BHUTAN"),
    ("BOL", "BOLIVIA (PLURINATIONAL STATE OF)"),
    ("BES", "BONAIRE, SINT EUSTATIUS AND SABA"),
    ("BIH", "BOSNIA AND HERZEGOVINA"),
    ("BWA", "BOTSWANA"),
    ("BVT", "BOUVET ISLAND"),
    ("BRA", "BRAZIL"),
    ("IOT", "BRITISH INDIAN OCEAN TERRITORY"),
    ("BRN", "BRUNEI DARUSSALAM"),
    ("BGR", "BULGARIA"),
    ("BFA", "BURKINA FASO"),
    ("BDI", "BURUNDI"),
    ("CPV", "CABO VERDE"),
    ("KHM", "CAMBODIA"),
    ("CMR", "CAMEROON"),
    ("CAN", "CANADA"),
    ("CYM", "CAYMAN ISLANDS"),
    ("CAF", "CENTRAL AFRICAN REPUBLIC"),
    ("TCD", "CHAD"),
    ("CHL", "CHILE"),
    ("CHN", "CHINA"),
    ("CXR", "CHRISTMAS ISLAND"),
    ("CCK", "COCOS (KEELING) ISLANDS"),
    ("COL", "COLOMBIA"),
    ("COM", "COMOROS"),
    ("COG", "CONGO"),
    ("COD", "CONGO, DEMOCRATIC REPUBLIC OF THE"),
    ("COK", "COOK ISLANDS"),
    ("CRI", "COSTA RICA"),
    ("CIV", "COTE D'IVOIRE"),
    ("HRV", "CROATIA"),
    ("CUB", "CUBA"),
    ("CUW", "CURACAO"),
    ("CYP", "CYPRUS"),
    ("CZE", "CZECHIA"),
    ("DNK", "DENMARK"),
    ("DJI", "DJIBOUTI"),
    ("DMA", "DOMINICA"),
    ("DOM", "DOMINICAN REPUBLIC"),
    ("ECU", "ECUADOR"),
    ("EGY", "EGYPT"),
    ("SLV", "EL SALVADOR"),
    ("GNQ", "EQUATORIAL GUINEA"),
    ("ERI", "ERITREA"),
    ("EST", "ESTONIA"),
    ("SWZ", "ESWATINI"),
    ("ETH", "ETHIOPIA"),
    ("FLK", "FALKLAND ISLANDS (MALVINAS)"),
    ("FRO", "FAROE ISLANDS"),
    ("FJI", "FIJI"),
    ("FIN", "FINLAND"),
    ("FRA", "FRANCE"),
    ("GUF", "FRENCH GUIANA"),
    ("PYF", "FRENCH POLYNESIA"),
    ("ATF", "FRENCH SOUTHERN TERRITORIES"),
    ("GAB", "GABON"),
    ("GMB", "GAMBIA"),
    ("GEO", "GEORGIA"),
    ("DEU", "GERMANY"),
    ("GHA", "GHANA"),
    ("GIB", "GIBRALTAR"),
    ("GRC", "GREECE"),
    ("GRL", "GREENLAND"),
    ("GRD", "GRENADA"),
    ("GLP", "GUADELOUPE"),
    ("GUM", "GUAM"),
    ("GTM", "GUATEMALA"),
    ("GGY", "GUERNSEY"),
    ("GIN", "GUINEA"),
    ("GNB", "GUINEA-BISSAU"),
    ("GUY", "GUYANA"),
    ("HTI", "HAITI"),
    ("HMD", "HEARD ISLAND AND MCDONALD ISLANDS"),
    ("VAT", "HOLY SEE"),
    ("HND", "HONDURAS"),
    ("HKG", "HONG KONG"),
    ("HUN", "HUNGARY"),
    ("ISL", "ICELAND"),
    ("IND", "INDIA"),
    ("IDN", "INDONESIA"),
    ("IRN", "IRAN (ISLAMIC REPUBLIC OF)"),
    ("IRQ", "IRAQ"),
    ("IRL", "IRELAND"),
    ("IMN", "ISLE OF MAN"),
    ("ISR", "ISRAEL"),
    ("ITA", "ITALY"),
    ("JAM", "JAMAICA"),
    ("JPN", "JAPAN"),
    ("JEY", "JERSEY"),
    ("JOR", "JORDAN"),
    ("KAZ", "KAZAKHSTAN"),
    ("KEN", "KENYA"),
    ("KIR", "KIRIBATI"),
    ("PRK", "KOREA (DEMOCRATIC PEOPLE'S REPUBLIC OF)"),
    ("KOR", "KOREA, REPUBLIC OF"),
    ("KWT", "KUWAIT"),
    ("KGZ", "KYRGYZSTAN"),
    ("LAO", "LAO PEOPLE'S DEMOCRATIC REPUBLIC"),
    ("LVA", "LATVIA"),
    ("LBN", "LEBANON"),
    ("LSO", "LESOTHO"),
    ("LBR", "LIBERIA"),
    ("LBY", "LIBYA"),
    ("LIE", "LIECHTENSTEIN"),
    ("LTU", "LITHUANIA"),
    ("LUX", "LUXEMBOURG"),
    ("MAC", "MACAO"),
    ("MDG", "MADAGASCAR"),
    ("MWI", "MALAWI"),
    ("MYS", "MALAYSIA"),
    ("MDV", "MALDIVES"),
    ("MLI", "MALI"),
    ("MLT", "MALTA"),
    ("MHL", "MARSHALL ISLANDS"),
    ("MTQ", "MARTINIQUE"),
    ("MRT", "MAURITANIA"),
    ("MUS", "MAURITIUS"),
    ("MYT", "MAYOTTE"),
    ("MEX", "MEXICO"),
    ("FSM", "MICRONESIA (FEDERATED STATES OF)"),
    ("MDA", "MOLDOVA, REPUBLIC OF"),
    ("MCO", "MONACO"),
    ("MNG", "MONGOLIA"),
    ("MNE", "MONTENEGRO"),
    ("MSR", "MONTSERRAT"),
    ("MAR", "MOROCCO"),
    ("MOZ", "MOZAMBIQUE"),
    ("MMR", "MYANMAR"),
    ("NAM", "NAMIBIA"),
    ("NRU", "NAURU"),
    ("NPL", "NEPAL"),
    ("NLD", "NETHERLANDS"),
    ("NCL", "NEW CALEDONIA"),
    ("NZL", "NEW ZEALAND"),
    ("NIC", "NICARAGUA"),
    ("NER", "NIGER"),
    ("NGA", "NIGERIA"),
    ("NIU", "NIUE"),
    ("NFK", "NORFOLK ISLAND"),
    ("MKD", "NORTH MACEDONIA"),
    ("MNP", "NORTHERN MARIANA ISLANDS"),
    ("NOR", "NORWAY"),
    ("OMN", "OMAN"),
    ("PAK", "PAKISTAN"),
    ("PLW", "PALAU"),
    ("PSE", "PALESTINE, STATE OF"),
    ("PAN", "PANAMA"),
    ("PNG", "PAPUA NEW GUINEA"),
    ("PRY", "PARAGUAY"),
    ("PER", "PERU"),
    ("PHL", "PHILIPPINES"),
    ("PCN", "PITCAIRN"),
    ("POL", "POLAND"),
    ("PRT", "PORTUGAL"),
    ("PRI", "PUERTO RICO"),
    ("QAT", "QATAR"),
    ("REU", "REUNION"),
    ("ROU", "ROMANIA"),
    ("RUS", "RUSSIAN FEDERATION"),
    ("RWA", "RWANDA"),
    ("BLM", "SAINT BARTHELEMY"),
    ("SHN", "SAINT HELENA, ASCENSION AND TRISTAN DA CUNHA"),
    ("KNA", "SAINT KITTS AND NEVIS"),
    ("LCA", "SAINT LUCIA"),
    ("MAF", "SAINT MARTIN (FRENCH PART)"),
    ("SPM", "SAINT PIERRE AND MIQUELON"),
    ("VCT", "SAINT VINCENT AND THE GRENADINES"),
    ("WSM", "SAMOA"),
    ("SMR", "SAN MARINO"),
    ("STP", "SAO TOME AND PRINCIPE"),
    ("SAU", "SAUDI ARABIA"),
    ("SEN", "SENEGAL"),
    ("SRB", "SERBIA"),
    ("SYC", "SEYCHELLES"),
    ("SLE", "SIERRA LEONE"),
    ("SGP", "SINGAPORE"),
    ("SXM", "SINT MAARTEN (DUTCH PART)"),
    ("SVK", "SLOVAKIA"),
    ("SVN", "SLOVENIA"),
    ("SLB", "SOLOMON ISLANDS"),
    ("SOM", "SOMALIA"),
    ("ZAF", "SOUTH AFRICA"),
    ("SGS", "SOUTH GEORGIA AND THE SOUTH SANDWICH ISLANDS"),
    ("SSD", "SOUTH SUDAN"),
    ("ESP", "SPAIN"),
    ("LKA", "SRI LANKA"),
    ("SDN", "SUDAN"),
    ("SUR", "SURINAME"),
    ("SJM", "SVALBARD AND JAN MAYEN"),
    ("SWE", "SWEDEN"),
    ("CHE", "SWITZERLAND"),
    ("SYR", "SYRIAN ARAB REPUBLIC"),
    ("TWN", "TAIWAN, PROVINCE OF CHINA"),
    ("TJK", "TAJIKISTAN"),
    ("TZA", "TANZANIA, UNITED REPUBLIC OF"),
    ("THA", "THAILAND"),
    ("TLS", "TIMOR-LESTE"),
    ("TGO", "TOGO"),
    ("TKL", "TOKELAU"),
    ("TON", "TONGA"),
    ("TTO", "TRINIDAD AND TOBAGO"),
    ("TUN", "TUNISIA"),
    ("TUR", "TURKIYE"),
    ("TKM", "TURKMENISTAN"),
    ("TCA", "TURKS AND CAICOS ISLANDS"),
    ("TUV", "TUVALU"),
    ("UGA", "UGANDA"),
    ("UKR", "UKRAINE"),
    ("ARE", "UNITED ARAB EMIRATES"),
    ("GBR", "UNITED KINGDOM OF GREAT BRITAIN AND NORTHERN IRELAND"),
    ("USA", "UNITED STATES OF AMERICA"),
    ("UMI", "UNITED STATES MINOR OUTLYING ISLANDS"),
    ("URY", "URUGUAY"),
    ("UZB", "UZBEKISTAN"),
    ("VUT", "VANUATU"),
    ("VEN", "VENEZUELA (BOLIVARIAN REPUBLIC OF)"),
    ("VNM", "VIET NAM"),
    ("VGB", "VIRGIN ISLANDS (BRITISH)"),
    ("VIR", "VIRGIN ISLANDS (U.S.)"),
    ("WLF", "WALLIS AND FUTUNA"),
    ("ESH", "WESTERN SAHARA"),
    ("YEM", "YEMEN"),
    ("ZMB", "ZAMBIA"),
    ("ZWE", "ZIMBABWE"),
];

/// Codes outside the registry that are still accepted in the unified table.
pub const EXTRA_CODES: &[&str] = &["XKX"];

pub fn is_known_code(code: &str) -> bool {
    EXTRA_CODES.contains(&code) || REGISTRY.iter().any(|(known, _)| *known == code)
}

pub fn name_of(code: &str) -> Option<&'static str> {
    REGISTRY
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
        .or(if code == "XKX" { Some("KOSOVO") } else { None })
}
