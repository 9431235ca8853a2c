//! Glossary of measurement techniques found in the registry.

/// Technique name and a one-paragraph description
pub const TECHNIQUE_DEFINITIONS: &[(&str, &str)] = &[
    ("Neutron Diffraction", "Sensitive to light elements (Li, O) and isotopes. Used to determine long-range crystal structure and phase evolution."),
    ("Muon spectroscopy", "A sensitive local probe (μ+SR) used to quantify ion diffusion rates (Li+, Na+) and pathways at the atomic scale."),
    ("Muon Elemental Analysis", "Uses negative muons (μ-SR/μXES) to probe elemental composition far below the surface without destruction."),
    ("SANS", "Small Angle Neutron Scattering. Probes nanoscale structures (1-100 nm), such as porosity, SEI formation, and particle morphology."),
    ("XPDF", "X-ray Pair Distribution Function. Probes local structure in disordered/amorphous materials (e.g., electrolytes)."),
    ("XAS", "X-ray Absorption Spectroscopy. Probes oxidation states, bond lengths, and local coordination geometry."),
    ("XRS", "X-ray Raman Scattering. Provides electronic structure information using hard X-rays; suitable for bulk measurements."),
    ("Soft XPS", "X-ray Photoelectron Spectroscopy. Surface-sensitive (<10 nm) analysis of elemental composition and SEI chemistry."),
    ("AP-XPS", "Ambient Pressure XPS. Allows surface analysis at realistic pressures (solid-gas/solid-liquid interfaces), bridging the pressure gap."),
    ("NEXAFS", "Near-Edge X-ray Absorption Fine Structure. Probes electronic structure of light elements at surfaces."),
    ("Nano-focus XRF", "X-ray Fluorescence microscopy. Maps elemental distribution with nanoscale resolution."),
    ("XANES", "X-ray Absorption Near Edge Structure. Determines oxidation state and local symmetry."),
    ("Imaging", "Visualises macroscopic features like dendrites, gas evolution, and particle cracking (2D/3D)."),
    ("XRD", "X-ray Diffraction. Determines crystal structure, lattice parameters, strain, and phase evolution during cycling."),
    ("XRD-CT", "X-ray Diffraction Computed Tomography. Combines diffraction contrast with tomography to map phase distributions and strain fields in 3D."),
    ("DFXM", "Dark Field X-ray Microscopy. Allows high-resolution mapping of crystal orientation and strain within individual grains."),
    ("EXAFS", "Extended X-ray Absorption Fine Structure. Analyzes average local structure and coordination numbers in materials lacking long-range order."),
    ("RIXS", "Resonant Inelastic X-ray Scattering. Probes orbital states and charge transfer dynamics."),
    ("Neutron Total Scattering", "Characterises non-crystalline/disordered materials (e.g., liquids) using H/D isotopic substitution."),
    ("QENS", "Quasi-Elastic Neutron Scattering. Probes slow diffusional processes like Li-ion hopping."),
    ("INS", "Inelastic Neutron Scattering. Probes vibrational modes to investigate material dynamics."),
    ("Bragg Edge Imaging", "Maps crystal texture, phase distribution, and lattice strain in real space."),
    ("Ptychography", "High-resolution phase-contrast imaging for nanoscale morphology."),
    ("Neutron Reflectometry", "Measures thin films and buried interfaces."),
];

/// Look up a technique definition.
///
/// An exact (case-insensitive) name wins; otherwise the longest glossary term
/// contained in `technique` is used, so "operando XRD-CT" resolves to XRD-CT
/// rather than XRD.
#[must_use]
pub fn describe(technique: &str) -> Option<&'static str> {
    let needle = technique.to_lowercase();

    if let Some((_, text)) = TECHNIQUE_DEFINITIONS
        .iter()
        .find(|(name, _)| name.to_lowercase() == needle)
    {
        return Some(*text);
    }

    TECHNIQUE_DEFINITIONS
        .iter()
        .filter(|(name, _)| needle.contains(&name.to_lowercase()))
        .max_by_key(|(name, _)| name.len())
        .map(|(_, text)| *text)
}
