//! Files written verbatim when a new project is created.

pub const DEFAULT_PROJECT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Project type = "Project">
    <EditorCamera type = "EditorCamera" >
        <Translation x = "2.5" y="3.535533" z="2.5" />
        <Rotation x = "45" y="45" z="0" />
    </EditorCamera>
    <DefaultScene type = "Scene">
        <Skybox type = "Skybox">
            <SkyboxRenderComponent>
                <Color r = "1" g="1" b="1" a="1" />
                <Texture>Textures\Skybox.dds</Texture>
            </SkyboxRenderComponent>
        </Skybox>
        <Grid type = "Grid" >
            <GridRenderComponent >
                <Color r = "1" g="1" b="1" a="1" />
                <Texture>Textures\Grid.dds</Texture>
                <GridSize x = "10" y="10" />
                <TicksInterval>1.0</TicksInterval>
            </GridRenderComponent>
        </Grid>
    </DefaultScene>
</Project>
"#;

pub const DEFAULT_ASSET_XML: &str = r#"<Assets>
    <Effects>
        <Effect name="DefaultEffect" object="Effects\DefaultEffect.fx">Effects\DefaultEffect.fx</Effect>
    </Effects>
    <Materials>
        <Material name="DefaultMaterial">Materials\DefaultMaterial.mat</Material>
    </Materials>
    <Models/>
    <Textures>
        <Texture name="DefaultColor">Textures\DefaultColor.dds</Texture>
    </Textures>
</Assets>
"#;
