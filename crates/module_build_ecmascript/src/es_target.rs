use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ESTarget {
  Es2015,
  Es2016,
  Es2017,
  Es2018,
  Es2019,
  Es2020,
  Es2021,
  Es2022,
  Es2023,
  Es2024,
  #[default]
  EsNext,
}

impl ESTarget {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Es2015 => "es2015",
      Self::Es2016 => "es2016",
      Self::Es2017 => "es2017",
      Self::Es2018 => "es2018",
      Self::Es2019 => "es2019",
      Self::Es2020 => "es2020",
      Self::Es2021 => "es2021",
      Self::Es2022 => "es2022",
      Self::Es2023 => "es2023",
      Self::Es2024 => "es2024",
      Self::EsNext => "esnext",
    }
  }
}

impl FromStr for ESTarget {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "es2015" | "es6" => Ok(Self::Es2015),
      "es2016" => Ok(Self::Es2016),
      "es2017" => Ok(Self::Es2017),
      "es2018" => Ok(Self::Es2018),
      "es2019" => Ok(Self::Es2019),
      "es2020" => Ok(Self::Es2020),
      "es2021" => Ok(Self::Es2021),
      "es2022" => Ok(Self::Es2022),
      "es2023" => Ok(Self::Es2023),
      "es2024" => Ok(Self::Es2024),
      "esnext" => Ok(Self::EsNext),
      _ => Err(format!("Invalid target \"{s}\".")),
    }
  }
}

#[test]
fn parse_target_names() {
  assert_eq!("ESNext".parse::<ESTarget>(), Ok(ESTarget::EsNext));
  assert_eq!("es6".parse::<ESTarget>(), Ok(ESTarget::Es2015));
  assert!("es3".parse::<ESTarget>().is_err());
}
