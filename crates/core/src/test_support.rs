//! Shared fixtures for unit tests.

use crate::catalog::InMemoryCatalog;

pub(crate) const SAMPLE_CATALOG_YAML: &str = r#"
symptoms:
  - { id: s-headache, name: 두통, description: 머리가 아픈 증상, category: 두부, display_order: 1 }
  - { id: s-indigestion, name: 소화불량, category: 소화기, display_order: 3 }
  - { id: s-fatigue, name: 피로, category: 전신, display_order: 2 }
  - { id: s-insomnia, name: 불면, category: 신경, display_order: 4 }
  - { id: s-retired, name: 복통, category: 소화기, display_order: 5, is_active: false }

questions:
  - id: q-sleep
    text: 수면의 질은 어떤가요?
    type: slider
    min: 0
    max: 10
    display_order: 3
  - id: q-fatigue
    text: 평소 피로감을 느끼는 정도는?
    type: radio
    options:
      - { value: 1, label: 거의 없다 }
      - { value: 2, label: 가끔 }
      - { value: 3, label: 자주 }
    display_order: 1
  - id: q-headache-intensity
    symptom_id: s-headache
    text: 두통의 강도는?
    type: slider
    min: 0
    max: 10
    display_order: 2
  - id: q-retired
    text: 더 이상 쓰지 않는 질문
    type: radio
    options:
      - { value: a, label: 예 }
      - { value: b, label: 아니오 }
    display_order: 4
    is_active: false

syndromes:
  - id: qi-deficiency
    name: 기허
    description: 기가 부족한 상태
    category: 허증
    characteristics:
      primarySymptoms: [피로, 무기력, 호흡곤란]
      tongue: 담백설
      pulse: 약맥
  - id: phlegm
    name: 담음
    category: 소화기
    characteristics:
      primarySymptoms: [가래, 어지러움, 메스꺼움]
  - id: blood-stasis
    name: 어혈
    description: 혈액 순환이 원활하지 않은 상태
    category: 실증
    characteristics:
      primarySymptoms: [통증, 두통, 생리통]
  - id: retired-pattern
    name: 폐기된 변증
    characteristics: 두통 피로 소화불량
    is_active: false

treatment_axes:
  - { id: ax-relieve-pain, syndrome_id: blood-stasis, name: 지통법, display_order: 5 }
  - { id: ax-tonify-qi, syndrome_id: qi-deficiency, name: 보기법, description: 기를 보충하는 치료 방법, display_order: 1 }
  - { id: ax-move-blood, syndrome_id: blood-stasis, name: 활혈법, display_order: 2 }
  - { id: ax-resolve-phlegm, syndrome_id: phlegm, name: 화담법, display_order: 3 }
  - { id: ax-strengthen-spleen, syndrome_id: qi-deficiency, name: 건비법, display_order: 4 }

herbs:
  - { id: h-ginseng, name: 인삼, scientific_name: Panax ginseng, effect: 보기 }
  - { id: h-astragalus, name: 황기, scientific_name: Astragalus membranaceus }
  - { id: h-pinellia, name: 반하, scientific_name: Pinellia ternata }
  - { id: h-angelica, name: 당귀, scientific_name: Angelica sinensis }
  - { id: h-cnidium, name: 천궁, scientific_name: Ligusticum chuanxiong }
  - { id: h-retired, name: 폐기약, is_active: false }

syndrome_herbs:
  - { syndrome_id: qi-deficiency, herb_id: h-ginseng, relevance_score: 2.0, evidence: 원기를 크게 보함 }
  - { syndrome_id: qi-deficiency, herb_id: h-astragalus, relevance_score: 1.8 }
  - { syndrome_id: qi-deficiency, herb_id: h-retired, relevance_score: 3.0 }
  - { syndrome_id: phlegm, herb_id: h-pinellia, relevance_score: 2.0 }
  - { syndrome_id: blood-stasis, herb_id: h-angelica, relevance_score: 1.8 }
  - { syndrome_id: blood-stasis, herb_id: h-cnidium, relevance_score: 2.0, reference_url: "https://example.org/cnidium" }
  - { syndrome_id: blood-stasis, herb_id: h-ginseng, relevance_score: 1.5 }
"#;

pub(crate) fn sample_catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_yaml_str(SAMPLE_CATALOG_YAML).expect("sample catalog should load")
}

pub(crate) fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
